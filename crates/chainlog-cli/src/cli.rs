use std::net::SocketAddr;
use std::path::PathBuf;

use chainlog_sdk::Retries;
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_HOST: &str = "http://127.0.0.1:4000";

#[derive(Parser)]
#[command(
    name = "chainlog",
    about = "chainlog: a tamper-evident append-only transaction log",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

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
    /// Run a ledger server
    Serve(ServeArgs),
    /// Show a server's status
    Status(StatusArgs),
    /// Append transactions
    Publish(PublishArgs),
    /// Follow the ledger from an index
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// TOML server configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Network type reported by the status route
    #[arg(long)]
    pub network_type: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,
}

#[derive(Args)]
pub struct PublishArgs {
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,
    /// Transaction type
    #[arg(long = "type", default_value = "")]
    pub tx_type: String,
    /// Expected network seed (hex)
    #[arg(long)]
    pub seed: Option<String>,
    /// Return before the transactions are sequenced
    #[arg(long = "async")]
    pub async_append: bool,
    /// Transaction payloads, one transaction each
    #[arg(required = true)]
    pub data: Vec<String>,
}

#[derive(Args)]
pub struct ScanArgs {
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,
    /// Only show transactions of this type
    #[arg(long = "type")]
    pub tx_type: Option<String>,
    /// Expected network seed (hex)
    #[arg(long)]
    pub seed: Option<String>,
    /// Consecutive failed reads to tolerate, or "inf"
    #[arg(long, default_value = "0", value_parser = parse_retries)]
    pub retries: Retries,
    /// Seconds between retries
    #[arg(long, default_value_t = 5)]
    pub retry_period: u64,
    /// First index to show
    #[arg(default_value_t = 1)]
    pub index: i64,
}

fn parse_retries(s: &str) -> Result<Retries, String> {
    if s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("infinite") {
        return Ok(Retries::Infinite);
    }
    s.parse()
        .map(Retries::Limited)
        .map_err(|_| format!("expected a count or \"inf\", got {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["chainlog", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:9000".parse().unwrap()));
            assert!(args.config.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_publish() {
        let cli = Cli::try_parse_from([
            "chainlog", "publish", "--type", "orders", "--async", "one", "two",
        ])
        .unwrap();
        if let Command::Publish(args) = cli.command {
            assert_eq!(args.tx_type, "orders");
            assert!(args.async_append);
            assert_eq!(args.data, ["one", "two"]);
            assert_eq!(args.host, DEFAULT_HOST);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn publish_needs_data() {
        assert!(Cli::try_parse_from(["chainlog", "publish"]).is_err());
    }

    #[test]
    fn parse_scan() {
        let cli = Cli::try_parse_from([
            "chainlog", "scan", "--type", "orders", "--retries", "inf", "7",
        ])
        .unwrap();
        if let Command::Scan(args) = cli.command {
            assert_eq!(args.tx_type.as_deref(), Some("orders"));
            assert_eq!(args.retries, Retries::Infinite);
            assert_eq!(args.index, 7);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn scan_defaults() {
        let cli = Cli::try_parse_from(["chainlog", "--format", "json", "scan"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        if let Command::Scan(args) = cli.command {
            assert_eq!(args.index, 1);
            assert_eq!(args.retries, Retries::Limited(0));
            assert_eq!(args.retry_period, 5);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn bad_retries_rejected() {
        assert!(Cli::try_parse_from(["chainlog", "scan", "--retries", "lots"]).is_err());
    }
}
