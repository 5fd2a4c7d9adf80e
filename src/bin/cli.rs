//! RankKV CLI Client
//!
//! Command-line interface for interacting with RankKV. Prints the decoded
//! response, e.g. `(str) hello_world` or `(arr) len=2 ... (arr) end`.

use clap::{Parser, Subcommand};
use rankkv::network::Client;
use tracing_subscriber::{fmt, EnvFilter};

/// RankKV CLI
#[derive(Parser, Debug)]
#[command(name = "rankkv-cli")]
#[command(about = "CLI for the RankKV store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

// Numeric arguments stay strings: the server owns their validation.
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

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List all keys
    Keys,

    /// Add a member to a sorted set, or update its score
    Zadd {
        key: String,
        #[arg(allow_hyphen_values = true)]
        score: String,
        member: String,
    },

    /// Get a member's score
    Zscore { key: String, member: String },

    /// Remove a member from a sorted set
    Zrem { key: String, member: String },

    /// Seek to (score, member), skip `offset` members, list up to `limit`
    Zquery {
        key: String,
        #[arg(allow_hyphen_values = true)]
        score: String,
        member: String,
        #[arg(allow_hyphen_values = true)]
        offset: String,
        #[arg(allow_hyphen_values = true)]
        limit: String,
    },

    /// Send an arbitrary argument list
    Raw {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
}

impl Commands {
    fn into_parts(self) -> Vec<String> {
        let name = |s: &str| s.to_string();
        match self {
            Commands::Get { key } => vec![name("get"), key],
            Commands::Set { key, value } => vec![name("set"), key, value],
            Commands::Del { key } => vec![name("del"), key],
            Commands::Keys => vec![name("keys")],
            Commands::Zadd { key, score, member } => vec![name("zadd"), key, score, member],
            Commands::Zscore { key, member } => vec![name("zscore"), key, member],
            Commands::Zrem { key, member } => vec![name("zrem"), key, member],
            Commands::Zquery {
                key,
                score,
                member,
                offset,
                limit,
            } => vec![name("zquery"), key, score, member, offset, limit],
            Commands::Raw { args } => args,
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();
    let parts = args.command.into_parts();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match client.call(&parts) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            tracing::error!("Request failed: {}", e);
            std::process::exit(1);
        }
    }
}
