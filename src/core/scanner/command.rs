// src/core/scanner/command.rs

use std::str::FromStr;

use tracing::warn;
use url::Url;

use crate::core::error::ScanError;

/// Named preset controlling scan depth. Each profile selects one of the
/// scanner's bundled driver scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ScanProfile {
    Baseline,
    Api,
    Full,
}

impl ScanProfile {
    /// Parses a profile name; anything outside the known set is a
    /// configuration error, raised before any scan is attempted.
    pub fn parse(raw: &str) -> Result<Self, ScanError> {
        ScanProfile::from_str(raw)
            .map_err(|_| ScanError::Configuration(format!("unknown scan profile {raw:?}")))
    }

    fn script(self) -> &'static str {
        match self {
            ScanProfile::Baseline => "/zap/zap-baseline.py",
            ScanProfile::Api => "/zap/zap-api.py",
            ScanProfile::Full => "/zap/zap-full-scan.py",
        }
    }
}

/// Builds the exact argument vector for one scanner invocation.
///
/// The external tool is picky about argument order: profile script,
/// daemon flag, target, optional crawl budget, optional proxy
/// configuration, JSON output flags last.
#[derive(Debug, Clone)]
pub struct ScanCommandBuilder {
    profile: ScanProfile,
    crawl_timeout: Option<u32>,
    proxy: Option<String>,
}

impl ScanCommandBuilder {
    pub fn new(profile: ScanProfile, crawl_timeout: Option<u32>, proxy: Option<String>) -> Self {
        Self { profile, crawl_timeout, proxy }
    }

    /// Assembles the argv for `target`, writing the JSON report to
    /// `output_file` (a file name relative to the scanner's work dir).
    pub fn build(&self, target: &str, output_file: &str) -> Vec<String> {
        let mut command = vec![
            self.profile.script().to_string(),
            "-d".to_string(),
            "-t".to_string(),
            target.to_string(),
        ];
        if let Some(minutes) = self.crawl_timeout {
            command.push("-m".to_string());
            command.push(minutes.to_string());
        }
        if let Some(proxy) = self.proxy.as_deref()
            && let Some(config) = proxy_config_argument(proxy)
        {
            command.push("-z".to_string());
            command.push(config);
        }
        command.push("-j".to_string());
        command.push("-J".to_string());
        command.push(output_file.to_string());
        command
    }
}

/// Renders the combined `-z` proxy payload from a `scheme://host:port`
/// URL. A proxy that does not parse into an explicit host and port is
/// dropped with a warning; the scan itself must never fail over it.
fn proxy_config_argument(proxy: &str) -> Option<String> {
    let parsed = match Url::parse(proxy) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(proxy, %error, "proxy is not a valid URL, scanning without it");
            return None;
        }
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => Some(format!(
            "-config network.connection.httpProxy.enabled=true \
             -config network.connection.httpProxy.host={host} \
             -config network.connection.httpProxy.port={port}"
        )),
        _ => {
            warn!(proxy, "proxy URL has no explicit host and port, scanning without it");
            None
        }
    }
}
