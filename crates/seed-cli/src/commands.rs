use anyhow::{bail, Context};
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use seed_crypto::{sign_hash, InMemorySignerRegistry, Signer};
use seed_ledger::{HandlerConfig, UnsignedPolicy};
use seed_protocol::CertifyRequest;
use seed_server::{DevValidator, SeedServer, ServerConfig, ValidatorConfig};
use seed_sync::{BackendEndpoint, CertifierConfig, MultiBackendCertifier, VerificationStatus};
use seed_types::AddressCodec;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::DevValidator(args) => cmd_dev_validator(args).await,
        Command::Keygen => cmd_keygen(format),
        Command::Sign(args) => cmd_sign(args, format),
        Command::Certify(args) => cmd_certify(args, format).await,
        Command::Lookup(args) => cmd_lookup(args, format).await,
        Command::Address(args) => cmd_address(args),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().context("invalid --bind address")?;
    }
    if let Some(url) = args.validator_url {
        config.validator_url = url;
    }
    let config = config.with_env();
    println!(
        "{} Certification facade on {} (validator: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.validator_url.cyan()
    );
    SeedServer::new(config).serve().await?;
    Ok(())
}

async fn cmd_dev_validator(args: DevValidatorArgs) -> anyhow::Result<()> {
    let config = ValidatorConfig {
        bind_addr: args.bind.parse().context("invalid --bind address")?,
        handler: HandlerConfig {
            unsigned_policy: if args.reject_unsigned {
                UnsignedPolicy::Reject
            } else {
                UnsignedPolicy::Accept
            },
        },
    };
    println!(
        "{} Development validator on {} (in-memory, not persistent)",
        "✓".green().bold(),
        config.bind_addr.to_string().bold()
    );
    DevValidator::new(config).serve().await?;
    Ok(())
}

fn cmd_keygen(format: OutputFormat) -> anyhow::Result<()> {
    let signer = Signer::generate();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "privateKey": signer.private_key_hex(),
                "publicKey": signer.public_key_hex(),
            })
        ),
        OutputFormat::Text => {
            println!("private_key = {}", signer.private_key_hex().yellow());
            println!("public_key  = {}", signer.public_key_hex().cyan());
            println!("{}", "Development key: do not use for production signers.".dimmed());
        }
    }
    Ok(())
}

fn load_registry(path: &std::path::Path) -> anyhow::Result<InMemorySignerRegistry> {
    InMemorySignerRegistry::from_toml_file(path)
        .with_context(|| format!("loading signers from {}", path.display()))
}

fn cmd_sign(args: SignArgs, format: OutputFormat) -> anyhow::Result<()> {
    let registry = load_registry(&args.signers)?;
    let signed = sign_hash(&registry, &args.hash, &args.signer)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&signed)?),
        OutputFormat::Text => {
            println!("{} Signed by {}", "✓".green().bold(), signed.signer_name.bold());
            println!("  Signature:  {}", signed.signature.yellow());
            println!("  Public key: {}", signed.public_key.cyan());
        }
    }
    Ok(())
}

fn certifier_config(args: &BackendArgs) -> anyhow::Result<CertifierConfig> {
    let mut config = match &args.certifier {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&source).with_context(|| format!("parsing {}", path.display()))?
        }
        None => CertifierConfig::default(),
    };
    if !args.backends.is_empty() {
        config.backends = args
            .backends
            .iter()
            .map(|(name, url)| BackendEndpoint {
                name: name.clone(),
                url: url.clone(),
            })
            .collect();
        config.primary = config.backends[0].name.clone();
    }
    if let Some(primary) = &args.primary {
        config.primary = primary.clone();
    }
    if config.backends.is_empty() {
        bail!("no backends configured");
    }
    Ok(config)
}

async fn cmd_certify(args: CertifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = certifier_config(&args.backend)?;
    let certifier = MultiBackendCertifier::from_config(&config)?;

    let mut request = CertifyRequest {
        record_id: args.record_id,
        class_name: args.class_name,
        hash: args.hash,
        timestamp: args
            .timestamp
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        ..Default::default()
    };
    request.validate()?;
    if let (Some(path), Some(signer)) = (&args.signers, &args.signer) {
        let signed = sign_hash(&load_registry(path)?, &request.hash, signer)?;
        request.signature = Some(signed.signature);
        request.public_key = Some(signed.public_key);
        request.signer_name = Some(signed.signer_name);
    }

    let receipt = certifier.certify(&config.primary, &request).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&receipt)?),
        OutputFormat::Text => {
            if receipt.committed {
                println!("{} Certified {}", "✓".green().bold(), request.record_id.bold());
            } else {
                println!(
                    "{} Submitted {} (confirmation pending)",
                    "…".yellow().bold(),
                    request.record_id.bold()
                );
            }
            println!("  Backend:     {}", receipt.backend_type.cyan());
            println!("  Transaction: {}", receipt.transaction_id.yellow());
        }
    }
    Ok(())
}

async fn cmd_lookup(args: LookupArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = certifier_config(&args.backend)?;
    let certifier = MultiBackendCertifier::from_config(&config)?;
    let expected = args.hash.as_deref().unwrap_or_default();
    let report = certifier.verify_all(&args.record_id, expected).await;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for backend in &report.backends {
        if !backend.found {
            println!("  {} {}", backend.backend.bold(), "not found".dimmed());
            continue;
        }
        let mark = if args.hash.is_none() {
            "found".normal()
        } else if backend.certified {
            "hash matches".green()
        } else {
            "hash differs".red()
        };
        println!("  {} {}", backend.backend.bold(), mark);
        if let Some(tx) = &backend.transaction_id {
            println!("    Transaction: {}", tx.yellow());
        }
        if let Some(ts) = &backend.timestamp {
            println!("    Timestamp:   {ts}");
        }
        if let Some(name) = &backend.signer_name {
            println!("    Signer:      {name}");
        }
    }
    if args.hash.is_some() {
        let summary = match report.status {
            VerificationStatus::Certified => "certified".green().bold(),
            VerificationStatus::FoundNotCertified => "found, not certified".yellow().bold(),
            VerificationStatus::NoLedgerRecord => "no ledger record".red().bold(),
        };
        println!("{} {}", args.record_id.bold(), summary);
    }
    Ok(())
}

fn cmd_address(args: AddressArgs) -> anyhow::Result<()> {
    let codec = AddressCodec::seed();
    println!("{}", codec.address(&args.record_id));
    Ok(())
}
