//! pgtext — PostgreSQL text-format codec CLI
//!
//! # Usage
//!
//! ```bash
//! # Decode a literal into JSON
//! pgtext decode 'int4[]' '{1,NULL,3}'
//!
//! # Encode JSON into a literal
//! pgtext encode daterange '{"Span":{"lower":{"Included":"2024-01-01"},"upper":"Unbounded"}}'
//!
//! # List registered types
//! pgtext types
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use qail_pgtext::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pgtext")]
#[command(author = "QAIL Contributors")]
#[command(version)]
#[command(about = "PostgreSQL text-format codec", long_about = None)]
#[command(after_help = "EXAMPLES:
    pgtext decode 'int4[]' '{1,NULL,3}'
    pgtext decode box '(3,3),(1,1)'
    pgtext encode hstore '{\"a\":\"1\",\"b\":null}'
    pgtext types")]
struct Cli {
    /// Config file (defaults to ./pgtext.toml, then the user config dir)
    #[arg(short, long, global = true, env = "PGTEXT_CONFIG")]
    config: Option<PathBuf>,

    /// Print compact JSON regardless of config
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a text-format literal into JSON
    Decode {
        /// Type name (`int4`, `text[]`, `_point`) or OID
        r#type: String,

        /// The literal; omit together with --null for a NULL value
        literal: Option<String>,

        /// Treat the value as SQL NULL
        #[arg(long, conflicts_with = "literal")]
        null: bool,
    },
    /// Encode a JSON value into a text-format literal
    Encode {
        /// Type name (`int4`, `text[]`, `_point`) or OID
        r#type: String,

        /// JSON value; `null` encodes SQL NULL
        json: String,
    },
    /// List registered types with their OIDs
    Types,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PGTEXT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let pretty = config.output.pretty && !cli.compact;

    match &cli.command {
        Commands::Decode {
            r#type,
            literal,
            null,
        } => {
            let spec = resolve(r#type)?;
            let raw = match literal {
                _ if *null => None,
                Some(literal) => Some(literal.as_bytes()),
                None => anyhow::bail!("missing literal (use --null for SQL NULL)"),
            };
            let value = spec
                .decode_json(raw, &config)
                .with_context(|| format!("decoding {}", spec))?;
            print_json(&value, pretty)?;
        }
        Commands::Encode { r#type, json } => {
            let spec = resolve(r#type)?;
            let value: Value = serde_json::from_str(json).context("parsing JSON input")?;
            match spec
                .encode_json(&value, &config)
                .with_context(|| format!("encoding {}", spec))?
            {
                Some(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
                None => println!("{}", "NULL".dimmed()),
            }
        }
        Commands::Types => show_types(),
    }
    Ok(())
}

/// Accept a type name or a numeric OID.
fn resolve(input: &str) -> Result<TypeSpec> {
    if let Ok(oid) = input.parse::<u32>() {
        return TypeSpec::from_oid(oid)
            .ok_or_else(|| CodecError::UnknownType(format!("oid {oid}")).into());
    }
    Ok(input.parse::<TypeSpec>()?)
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn show_types() {
    println!(
        "{:<14} {:>6} {:>8}",
        "TYPE".cyan().bold(),
        "OID".cyan().bold(),
        "ARRAY".cyan().bold()
    );
    for ty in PgType::ALL {
        let oid = match ty.oid() {
            0 => "-".to_string(),
            oid => oid.to_string(),
        };
        let array_oid = match ty.array_oid() {
            0 => "-".to_string(),
            oid => oid.to_string(),
        };
        println!("{:<14} {:>6} {:>8}", ty.name().green(), oid, array_oid.dimmed());
    }
}
