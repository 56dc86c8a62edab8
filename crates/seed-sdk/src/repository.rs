use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// A stored seed detection and its certification state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedImage {
    pub id: u64,
    pub prediction: Option<String>,
    pub confidence: Option<f64>,
    pub quality: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub bbox: Option<[f64; 4]>,
    pub cropped_image: Option<String>,
    pub blockchain_tx_id: Option<String>,
    pub blockchain_type: Option<String>,
    pub signer_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl SeedImage {
    /// Unsaved seed; the repository assigns the id.
    pub fn new() -> Self {
        Self {
            id: 0,
            prediction: None,
            confidence: None,
            quality: None,
            embedding: None,
            bbox: None,
            cropped_image: None,
            blockchain_tx_id: None,
            blockchain_type: None,
            signer_name: None,
            uploaded_at: Utc::now(),
        }
    }

    pub fn is_certified(&self) -> bool {
        self.blockchain_tx_id.is_some()
    }
}

impl Default for SeedImage {
    fn default() -> Self {
        Self::new()
    }
}

/// The application database, seen only through lookups and saves.
#[async_trait]
pub trait SeedRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> SdkResult<Option<SeedImage>>;

    /// Insert when `seed.id == 0`, otherwise replace. Returns the id.
    async fn save(&self, seed: SeedImage) -> SdkResult<u64>;

    /// Closest seed whose cosine distance to `embedding` is below `threshold`.
    async fn find_similar(&self, embedding: &[f32], threshold: f64)
        -> SdkResult<Option<(SeedImage, f64)>>;
}

/// Cosine distance `1 - cos(a, b)`; `None` for mismatched or zero vectors.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0f64, 0f64, 0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(1.0 - dot / (norm_a.sqrt() * norm_b.sqrt()))
}

#[derive(Default)]
pub struct InMemorySeedRepository {
    inner: RwLock<Seeds>,
}

#[derive(Default)]
struct Seeds {
    next_id: u64,
    by_id: BTreeMap<u64, SeedImage>,
}

impl InMemorySeedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> SdkError {
    SdkError::Repository("seed store lock poisoned".into())
}

#[async_trait]
impl SeedRepository for InMemorySeedRepository {
    async fn find_by_id(&self, id: u64) -> SdkResult<Option<SeedImage>> {
        Ok(self.inner.read().map_err(poisoned)?.by_id.get(&id).cloned())
    }

    async fn save(&self, mut seed: SeedImage) -> SdkResult<u64> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if seed.id == 0 {
            inner.next_id += 1;
            seed.id = inner.next_id;
        } else if !inner.by_id.contains_key(&seed.id) {
            return Err(SdkError::SeedNotFound(seed.id));
        }
        let id = seed.id;
        inner.by_id.insert(id, seed);
        Ok(id)
    }

    async fn find_similar(
        &self,
        embedding: &[f32],
        threshold: f64,
    ) -> SdkResult<Option<(SeedImage, f64)>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let best = inner
            .by_id
            .values()
            .filter_map(|seed| {
                let distance = cosine_distance(seed.embedding.as_deref()?, embedding)?;
                (distance < threshold).then_some((seed, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        Ok(best.map(|(seed, distance)| (seed.clone(), distance)))
    }
}
