// src/main.rs

use color_eyre::eyre::{Result, eyre};
use regex::Regex;
use tracing::error;

mod app;
mod cli;
mod core;
mod logging;

use crate::app::{App, JsonLinesSink, TargetSettings, VpnConfig};
use crate::core::error::ScanError;
use crate::core::scanner::{SystemProcessRunner, ZapWrapper};
use crate::core::telemetry::StatusTracker;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;
    let args = cli::parse();

    let scope = args
        .scope
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| eyre!("invalid scope pattern: {e}"))?;

    let runner = SystemProcessRunner;
    let mut wrapper = ZapWrapper::with_runner(
        &args.profile,
        args.crawl_timeout,
        args.proxy.clone(),
        runner,
    )?;
    if let Some(output_dir) = &args.output_dir {
        wrapper = wrapper.output_dir(output_dir);
    }

    let vpn_config = match (&args.vpn_config, &args.dns_config) {
        (Some(tunnel_path), Some(dns_path)) => Some(VpnConfig {
            tunnel: std::fs::read_to_string(tunnel_path)?,
            dns: std::fs::read_to_string(dns_path)?,
        }),
        _ => None,
    };

    let tracker = match (&args.reporting_endpoint, &args.reporting_token, args.scan_id) {
        (Some(endpoint), Some(token), Some(scan_id)) => {
            Some(StatusTracker::new(endpoint.clone(), token.clone(), scan_id))
        }
        _ => None,
    };

    let mut app = App::new(wrapper, runner, JsonLinesSink::new(std::io::stdout().lock()))
        .scope(scope)
        .target_settings(TargetSettings { https: args.https, port: args.port })
        .vpn_config(vpn_config)
        .tracker(tracker);

    match app.run(&args.target).await {
        Ok(_) => Ok(()),
        // An exhausted retry budget means this target produced nothing;
        // log it and move on instead of taking the whole run down.
        Err(error @ ScanError::RetryExhausted { .. }) => {
            error!(%error, target = %args.target, "skipping target");
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}
