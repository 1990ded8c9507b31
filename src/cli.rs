// src/cli.rs

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "zapline")]
#[command(version)]
#[command(about = "Run a ZAP scan against a target and emit normalized findings", long_about = None)]
pub struct Args {
    /// Target to scan: a full URL or a bare domain name
    pub target: String,

    /// Scan profile: baseline, api or full
    #[arg(short, long, default_value = "baseline")]
    pub profile: String,

    /// Crawl budget in minutes passed to the scanner
    #[arg(short = 'm', long)]
    pub crawl_timeout: Option<u32>,

    /// Route scanner traffic through this proxy (scheme://host:port)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Only scan and report targets matching this regular expression
    #[arg(long)]
    pub scope: Option<String>,

    /// Scheme used when the target is a bare domain name
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub https: bool,

    /// Port used when the target is a bare domain name
    #[arg(long, default_value_t = 443)]
    pub port: u16,

    /// WireGuard tunnel configuration file to scan through
    #[arg(long, requires = "dns_config")]
    pub vpn_config: Option<PathBuf>,

    /// Resolver configuration file to use with the tunnel
    #[arg(long, requires = "vpn_config")]
    pub dns_config: Option<PathBuf>,

    /// Directory the scanner writes its JSON report into
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Scan-status reporting endpoint; updates are best-effort
    #[arg(long, requires = "reporting_token")]
    pub reporting_endpoint: Option<String>,

    /// Authentication token for the reporting endpoint
    #[arg(long, requires = "scan_id")]
    pub reporting_token: Option<String>,

    /// Scan identifier status updates are attached to
    #[arg(long, requires = "reporting_endpoint")]
    pub scan_id: Option<i64>,
}

pub fn parse() -> Args {
    Args::parse()
}
