use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chainlog_ledger::Ledger;
use chainlog_sdk::{Client, Scanner, ScannerConfig};
use chainlog_server::{LedgerServer, ServerConfig};
use chainlog_types::{
    AppendRequest, NetworkSeed, SequencedTransaction, ServerStatus, UnsequencedTransaction,
};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Status(args) => cmd_status(args, format).await,
        Command::Publish(args) => cmd_publish(args, format).await,
        Command::Scan(args) => cmd_scan(args, format).await,
    }
}

fn parse_seed(seed: Option<&str>) -> anyhow::Result<NetworkSeed> {
    match seed {
        Some(text) => NetworkSeed::from_hex(text).context("invalid --seed"),
        None => Ok(NetworkSeed::empty()),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(network_type) = args.network_type {
        config.network_type = network_type;
    }

    let bind = config.bind_addr;
    let server = LedgerServer::new(config);
    let seed = server.ledger().network_seed().await?;
    println!(
        "{} chainlog server on {} (seed {})",
        "✓".green().bold(),
        bind.to_string().bold(),
        seed.short_hex().cyan()
    );
    server.serve_with_shutdown(shutdown_signal()).await?;
    println!("Server stopped.");
    Ok(())
}

fn status_json(status: &ServerStatus) -> serde_json::Value {
    json!({
        "network_type": status.network_type,
        "network_seed": status.seed.to_hex(),
        "last_index": status.last_index,
        "server_time": status.server_time,
        "ready": status.ready,
    })
}

async fn cmd_status(args: StatusArgs, format: OutputFormat) -> anyhow::Result<()> {
    let client = Client::new(&args.host)?;
    let status = client
        .server_status(None)
        .await
        .with_context(|| format!("failed to reach {}", args.host))?;
    match format {
        OutputFormat::Json => println!("{}", status_json(&status)),
        OutputFormat::Text => {
            let ready = if status.ready {
                "ready".green()
            } else {
                "not ready".red()
            };
            println!("Ledger at {} is {}", args.host.bold(), ready);
            println!("  Network: {}", status.network_type.cyan());
            println!("  Seed: {}", status.seed.to_hex().yellow());
            println!("  Last index: {}", status.last_index.to_string().bold());
            println!("  Server time: {}", format_time(status.server_time));
        }
    }
    Ok(())
}

async fn cmd_publish(args: PublishArgs, format: OutputFormat) -> anyhow::Result<()> {
    let client = Client::new(&args.host)?;
    let seed = parse_seed(args.seed.as_deref())?;
    let count = args.data.len();
    let transactions = args
        .data
        .into_iter()
        .map(|data| UnsequencedTransaction::new(args.tx_type.clone(), data.into_bytes()))
        .collect();
    let req = AppendRequest::new(seed, transactions);

    if args.async_append {
        client.append_transactions_async(req, None).await?;
        match format {
            OutputFormat::Json => println!("{}", json!({ "status": "pending", "count": count })),
            OutputFormat::Text => println!(
                "{} Submitted {} transaction(s)",
                "✓".green().bold(),
                count
            ),
        }
        return Ok(());
    }

    let result = client.append_transactions(req, None).await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "status": "sequenced", "count": count, "last_index": result.last_index })
        ),
        OutputFormat::Text => println!(
            "{} Appended {} transaction(s), last index {}",
            "✓".green().bold(),
            count,
            result.last_index.to_string().yellow()
        ),
    }
    Ok(())
}

async fn cmd_scan(args: ScanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let client = Arc::new(Client::new(&args.host)?);
    let seed = parse_seed(args.seed.as_deref())?;
    let mut config = ScannerConfig::default()
        .with_retries(args.retries)
        .with_retry_period(Duration::from_secs(args.retry_period));
    if let Some(tx_type) = args.tx_type {
        config = config.with_type_filter(tx_type);
    }

    let scanner = Scanner::new(client, config);
    let mut transactions = scanner.scan(args.index, seed);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            next = transactions.recv() => match next {
                Some(tx) => print_transaction(&tx, format),
                None => break,
            },
        }
    }
    if let Some(err) = scanner.error() {
        return Err(err).context("scan stopped");
    }
    Ok(())
}

fn format_time(nanos: i64) -> String {
    let time = DateTime::<Utc>::from_timestamp_nanos(nanos);
    time.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn print_transaction(tx: &SequencedTransaction, format: OutputFormat) {
    let data = String::from_utf8_lossy(&tx.data);
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "index": tx.index,
                "type": tx.tx_type,
                "timestamp": tx.timestamp,
                "data": data,
                "hash": hex::encode(&tx.hash),
                "state_hash": hex::encode(&tx.state_hash),
            })
        ),
        OutputFormat::Text => println!(
            "{} {} {} {}",
            tx.index.to_string().yellow().bold(),
            format_time(tx.timestamp).dimmed(),
            tx.tx_type.cyan(),
            data
        ),
    }
}
