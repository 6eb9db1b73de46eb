//! soroban-toolkit: contract spec and lifecycle CLI for Soroban
//!
//! ## Commands
//!
//! - **decode-spec**: split a raw contract spec buffer into entries
//! - **network**: show the passphrase and RPC endpoint of a network
//! - **restore**: prepare a transaction restoring a contract's instance entry
//! - **bump**: prepare an instance TTL bump transaction
//!
//! ## Example Usage
//!
//! ```bash
//! # Decode a spec section dumped from a contract
//! soroban-toolkit decode-spec ./contractspecv0.bin --json
//!
//! # Prepare an unsigned bump transaction on testnet
//! soroban-toolkit bump --contract CA... --source GB... --network testnet
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides `-v`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use soroban_toolkit::lifecycle::{prepare_expiration_bump, prepare_restore};
use soroban_toolkit::soroban_spec::{summarize_all, DecodeMode, SpecDecoder};
use soroban_toolkit::soroban_toolkit_types::encoding::bytes_to_hex;
use soroban_toolkit::soroban_toolkit_types::{
    AccountAddress, ContractAddress, Transaction, TransactionBuilder,
};
use soroban_toolkit::soroban_transport::{
    network_details, resolve_rpc_endpoint, NetworkTag, RpcClient,
};

#[derive(Parser)]
#[command(
    name = "soroban-toolkit",
    author,
    version,
    about = "Soroban contract spec decoding and lifecycle transactions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a raw contract spec buffer
    DecodeSpec {
        /// File holding the concatenated XDR spec entries
        file: PathBuf,

        /// Fail if the buffer has an undecodable tail
        #[arg(long)]
        strict: bool,

        /// Largest entry size to probe, in bytes
        #[arg(long)]
        max_entry_len: Option<usize>,
    },

    /// Show passphrase and RPC endpoint for a network
    Network {
        /// mainnet, testnet or futurenet (unknown values select futurenet)
        tag: Option<String>,
    },

    /// Prepare an unsigned transaction restoring a contract's instance entry
    Restore(LifecycleArgs),

    /// Prepare an unsigned instance TTL bump transaction
    Bump(LifecycleArgs),
}

#[derive(clap::Args)]
struct LifecycleArgs {
    /// Contract address (C...)
    #[arg(long)]
    contract: String,

    /// Source account (G...)
    #[arg(long)]
    source: String,

    /// Network tag
    #[arg(long, default_value = "futurenet")]
    network: NetworkTag,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    match command {
        Commands::DecodeSpec {
            file,
            strict,
            max_entry_len,
        } => decode_spec(&file, strict, max_entry_len, json),
        Commands::Network { tag } => {
            show_network(tag.as_deref().map(NetworkTag::parse_or_default), json)
        }
        Commands::Restore(args) => {
            let contract: ContractAddress = args.contract.parse()?;
            let (client, builder) = connect(&args).await?;
            let tx = prepare_restore(builder, &client, [contract.instance_key()]).await?;
            print_transaction(&tx, json)
        }
        Commands::Bump(args) => {
            // Reject a bad contract address before any RPC call.
            args.contract.parse::<ContractAddress>()?;
            let (client, builder) = connect(&args).await?;
            let tx =
                prepare_expiration_bump(builder, &client, &args.contract, &args.source).await?;
            print_transaction(&tx, json)
        }
    }
}

fn init_tracing(verbosity: u8) {
    let mut filter = EnvFilter::from_default_env();

    // Only apply defaults if RUST_LOG is not set
    if std::env::var("RUST_LOG").is_err() {
        let level = match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        filter = filter.add_directive(level.into());
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn decode_spec(
    file: &Path,
    strict: bool,
    max_entry_len: Option<usize>,
    json: bool,
) -> Result<()> {
    let buffer =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;

    let mut decoder = SpecDecoder::from_env();
    if strict {
        decoder = decoder.with_mode(DecodeMode::Strict);
    }
    if let Some(max) = max_entry_len {
        decoder = decoder.with_max_entry_len(max);
    }

    let decoded = decoder.decode(&buffer)?;
    let (consumed, discarded) = (decoded.consumed, decoded.discarded);
    let entries = decoded.into_entries();
    let summaries = summarize_all(&entries);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "entries": summaries,
                "consumed": consumed,
                "discarded": discarded,
            }))?
        );
    } else {
        for summary in &summaries {
            println!("{}", summary.signature());
        }
        if discarded > 0 {
            eprintln!(
                "warning: {} trailing bytes did not decode ({} entries, {} bytes decoded)",
                discarded,
                summaries.len(),
                consumed
            );
        }
    }
    Ok(())
}

fn show_network(tag: Option<NetworkTag>, json: bool) -> Result<()> {
    let tags = match tag {
        Some(tag) => vec![tag],
        None => NetworkTag::ALL.to_vec(),
    };
    let details: Vec<_> = tags
        .into_iter()
        .map(|tag| {
            let mut d = network_details(tag);
            d.rpc_url = resolve_rpc_endpoint(tag);
            d
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        for d in &details {
            println!("{}", d.network);
            println!("  passphrase: {}", d.passphrase);
            println!("  rpc:        {}", d.rpc_url);
        }
    }
    Ok(())
}

async fn connect(args: &LifecycleArgs) -> Result<(RpcClient, TransactionBuilder)> {
    let source: AccountAddress = args.source.parse()?;
    let client = RpcClient::for_network(args.network);
    tracing::debug!(endpoint = client.endpoint(), network = %args.network, "connecting");

    let account = client.get_account(&source).await?;
    Ok((client, TransactionBuilder::new(source, account.sequence)))
}

fn print_transaction(tx: &Transaction, json: bool) -> Result<()> {
    let envelope = tx.to_envelope_base64()?;
    let hash = bytes_to_hex(&tx.hash()?);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "hash": hash,
                "fee": tx.fee(),
                "sequence": tx.sequence(),
                "envelope_xdr": envelope,
            }))?
        );
    } else {
        println!("hash:     {}", hash);
        println!("fee:      {}", tx.fee());
        println!("sequence: {}", tx.sequence());
        println!("envelope: {}", envelope);
    }
    Ok(())
}
