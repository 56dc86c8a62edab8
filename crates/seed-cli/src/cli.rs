use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "seedctl", about = "SeedLedger: certify and verify seeds on a ledger", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the certification facade
    Serve(ServeArgs),
    /// Start a development validator backed by an in-memory ledger
    DevValidator(DevValidatorArgs),
    /// Generate a signing keypair (development only)
    Keygen,
    /// Sign a hash as a registered signer
    Sign(SignArgs),
    /// Certify a record, falling back across backends
    Certify(CertifyArgs),
    /// Look a record up on every backend
    Lookup(LookupArgs),
    /// Print the state address of a record id
    Address(AddressArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<String>,
    /// Overrides the config file; VALIDATOR_URL overrides both
    #[arg(long)]
    pub validator_url: Option<String>,
}

#[derive(Args)]
pub struct DevValidatorArgs {
    #[arg(long, default_value = "127.0.0.1:8008")]
    pub bind: String,
    /// Reject `create` actions without a signature
    #[arg(long)]
    pub reject_unsigned: bool,
}

#[derive(Args)]
pub struct SignArgs {
    /// Signer registry file
    #[arg(long)]
    pub signers: PathBuf,
    #[arg(long)]
    pub signer: String,
    /// Hex hash to sign
    pub hash: String,
}

#[derive(Args)]
pub struct BackendArgs {
    /// Certifier configuration file (`primary`, `[[backends]]`)
    #[arg(long)]
    pub certifier: Option<PathBuf>,
    /// Backend as NAME=URL; repeat for fallbacks, in order
    #[arg(long = "backend", value_parser = parse_backend)]
    pub backends: Vec<(String, String)>,
    /// Backend tried first; defaults to the first listed
    #[arg(long)]
    pub primary: Option<String>,
}

#[derive(Args)]
pub struct CertifyArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
    #[arg(long)]
    pub record_id: String,
    #[arg(long = "class")]
    pub class_name: String,
    #[arg(long)]
    pub hash: String,
    /// Defaults to the current UTC time
    #[arg(long)]
    pub timestamp: Option<String>,
    /// Signer registry file; the record is unsigned without it
    #[arg(long, requires = "signer")]
    pub signers: Option<PathBuf>,
    #[arg(long, requires = "signers")]
    pub signer: Option<String>,
}

#[derive(Args)]
pub struct LookupArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
    pub record_id: String,
    /// Hash the stored record is expected to carry
    #[arg(long)]
    pub hash: Option<String>,
}

#[derive(Args)]
pub struct AddressArgs {
    pub record_id: String,
}

pub fn parse_backend(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, url)) if !name.is_empty() && !url.is_empty() => {
            Ok((name.to_string(), url.to_string()))
        }
        _ => Err(format!("expected NAME=URL, got {s:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address() {
        let cli = Cli::try_parse_from(["seedctl", "address", "seed-42"]).unwrap();
        if let Command::Address(args) = cli.command {
            assert_eq!(args.record_id, "seed-42");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_certify_with_fallbacks() {
        let cli = Cli::try_parse_from([
            "seedctl", "certify",
            "--backend", "sawtooth=http://localhost:9000",
            "--backend", "fabric=http://localhost:3000",
            "--primary", "fabric",
            "--record-id", "s1", "--class", "oak", "--hash", "00",
        ])
        .unwrap();
        if let Command::Certify(args) = cli.command {
            assert_eq!(args.backend.backends.len(), 2);
            assert_eq!(args.backend.backends[1].0, "fabric");
            assert_eq!(args.backend.primary.as_deref(), Some("fabric"));
            assert!(args.signers.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn signer_needs_registry() {
        assert!(Cli::try_parse_from([
            "seedctl", "certify", "--record-id", "s1", "--class", "oak", "--hash", "00",
            "--signer", "Nursery_A",
        ])
        .is_err());
    }

    #[test]
    fn bad_backend_argument() {
        assert!(parse_backend("no-url").is_err());
        assert!(parse_backend("=http://x").is_err());
        assert_eq!(
            parse_backend("a=http://x?y=1").unwrap(),
            ("a".to_string(), "http://x?y=1".to_string())
        );
    }

    #[test]
    fn json_format_is_global() {
        let cli = Cli::try_parse_from(["seedctl", "keygen", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
