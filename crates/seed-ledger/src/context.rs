use std::collections::{BTreeMap, HashMap};

use crate::error::ContextError;

/// State access granted to a handler while it applies one transaction.
pub trait TransactionContext {
    /// Values currently stored at `addresses`. Absent addresses are omitted.
    fn get_state(&self, addresses: &[String]) -> Result<HashMap<String, Vec<u8>>, ContextError>;

    /// Stage writes, returning the addresses that were set.
    fn set_state(&mut self, entries: HashMap<String, Vec<u8>>)
        -> Result<Vec<String>, ContextError>;
}

/// Context over committed state plus the writes staged by earlier
/// transactions of the same batch.
///
/// Reads must fall under a declared input and writes under a declared
/// output; an entry may be a full address or a prefix of one.
pub struct ScratchContext<'a> {
    committed: &'a BTreeMap<String, Vec<u8>>,
    staged: &'a mut BTreeMap<String, Vec<u8>>,
    inputs: &'a [String],
    outputs: &'a [String],
}

impl<'a> ScratchContext<'a> {
    pub fn new(
        committed: &'a BTreeMap<String, Vec<u8>>,
        staged: &'a mut BTreeMap<String, Vec<u8>>,
        inputs: &'a [String],
        outputs: &'a [String],
    ) -> Self {
        Self {
            committed,
            staged,
            inputs,
            outputs,
        }
    }
}

fn declared(entries: &[String], address: &str) -> bool {
    entries.iter().any(|e| address.starts_with(e.as_str()))
}

impl TransactionContext for ScratchContext<'_> {
    fn get_state(&self, addresses: &[String]) -> Result<HashMap<String, Vec<u8>>, ContextError> {
        let mut found = HashMap::new();
        for address in addresses {
            if !declared(self.inputs, address) {
                return Err(ContextError::Unauthorized(address.clone(), "inputs"));
            }
            if let Some(value) = self
                .staged
                .get(address)
                .or_else(|| self.committed.get(address))
            {
                found.insert(address.clone(), value.clone());
            }
        }
        Ok(found)
    }

    fn set_state(
        &mut self,
        entries: HashMap<String, Vec<u8>>,
    ) -> Result<Vec<String>, ContextError> {
        if let Some(address) = entries.keys().find(|a| !declared(self.outputs, a)) {
            return Err(ContextError::Unauthorized(address.clone(), "outputs"));
        }
        let mut set = Vec::with_capacity(entries.len());
        for (address, value) in entries {
            self.staged.insert(address.clone(), value);
            set.push(address);
        }
        Ok(set)
    }
}
