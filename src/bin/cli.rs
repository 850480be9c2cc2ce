//! SQLite-DBM CLI
//!
//! Command-line interface for inspecting and editing a store file.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use sqlite_dbm::{Config, Dbm, DbmError, Dumper, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// SQLite-DBM CLI
#[derive(Parser, Debug)]
#[command(name = "sqlite-dbm")]
#[command(about = "Dict-style key-value store in a single SQLite file")]
#[command(version)]
struct Args {
    /// Database file (":memory:" for a throwaway store)
    #[arg(short, long, default_value = "./dbm.sqlite")]
    file: String,

    /// Value codec: native, json or text
    #[arg(short, long, default_value = "native")]
    dumper: String,

    /// Compression level, 0 disables
    #[arg(short, long, default_value = "9")]
    level: u8,

    /// Always compress, even when it makes a value larger
    #[arg(long)]
    no_smart: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value; parsed as JSON when possible, otherwise a string
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List all keys
    Keys,

    /// Print the number of keys
    Len,

    /// Delete every key
    Clear,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlite_dbm=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let dumper: Dumper = args.dumper.parse()?;
    if dumper == Dumper::RawHost {
        // bincode cannot decode into an untyped value
        return Err(DbmError::Config(
            "the raw dumper needs a concrete value type and is library-only".to_string(),
        ));
    }

    let config = Config::builder()
        .dumper(dumper)
        .compression_level(args.level)
        .smart_compress(!args.no_smart)
        .build();

    tracing::debug!("SQLite-DBM v{} on {}", sqlite_dbm::VERSION, args.file);

    let mut db: Dbm<Value> = Dbm::open(args.file.as_str(), config)?;

    match args.command {
        Commands::Get { key } => match db.get(&key)? {
            Value::String(text) => println!("{}", text),
            other => println!("{}", other),
        },
        Commands::Set { key, value } => {
            let value = parse_value(&value, dumper);
            db.set(&key, &value)?;
        }
        Commands::Del { key } => db.delete(&key)?,
        Commands::Keys => {
            for key in db.iter() {
                println!("{}", key?);
            }
        }
        Commands::Len => println!("{}", db.len()?),
        Commands::Clear => db.clear()?,
    }

    db.close()
}

/// The text dumper stores strings verbatim; the others get JSON when it parses
fn parse_value(input: &str, dumper: Dumper) -> Value {
    if dumper == Dumper::PlainText {
        return Value::String(input.to_string());
    }
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}
