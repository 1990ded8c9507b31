// src/core/scanner/vpn.rs

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::core::error::ScanError;
use crate::core::scanner::process::ProcessRunner;

const WIREGUARD_CONFIG_PATH: &str = "/etc/wireguard/wg0.conf";
const DNS_RESOLV_CONFIG_PATH: &str = "/etc/resolv.conf";

/// Bringing the tunnel up is quick; a minute is already generous.
const BRING_UP_CEILING: Duration = Duration::from_secs(60);

/// Routes scan traffic through a WireGuard tunnel.
///
/// The tunnel and resolver configurations are written verbatim to their
/// well-known locations, then the tunnel is brought up. A failing
/// bring-up degrades scan quality but not the scan itself, so it is
/// logged and swallowed; empty configuration text on the other hand is
/// rejected before anything touches the filesystem.
#[derive(Debug, Clone)]
pub struct VpnSetup {
    wireguard_path: PathBuf,
    resolv_path: PathBuf,
}

impl Default for VpnSetup {
    fn default() -> Self {
        Self {
            wireguard_path: PathBuf::from(WIREGUARD_CONFIG_PATH),
            resolv_path: PathBuf::from(DNS_RESOLV_CONFIG_PATH),
        }
    }
}

impl VpnSetup {
    /// Overrides the configuration file locations, for tests.
    #[cfg(test)]
    pub fn with_paths(wireguard_path: impl Into<PathBuf>, resolv_path: impl Into<PathBuf>) -> Self {
        Self { wireguard_path: wireguard_path.into(), resolv_path: resolv_path.into() }
    }

    /// Persists both configurations and brings the tunnel up.
    pub async fn bring_up<R: ProcessRunner>(
        &self,
        runner: &R,
        tunnel_config: &str,
        dns_config: &str,
    ) -> Result<(), ScanError> {
        if tunnel_config.trim().is_empty() {
            return Err(ScanError::Configuration(
                "tunnel configuration is empty".to_string(),
            ));
        }
        if dns_config.trim().is_empty() {
            return Err(ScanError::Configuration(
                "DNS resolver configuration is empty".to_string(),
            ));
        }

        tokio::fs::write(&self.wireguard_path, tunnel_config).await?;
        tokio::fs::write(&self.resolv_path, dns_config).await?;

        let command = ["wg-quick", "up", "wg0"].map(String::from);
        match runner.run(&command, BRING_UP_CEILING).await {
            Ok(outcome) if outcome.status_code == Some(0) => {
                info!("tunnel is up");
            }
            Ok(outcome) => {
                warn!(
                    code = ?outcome.status_code,
                    stderr = %outcome.stderr,
                    "tunnel bring-up failed, scanning without it"
                );
            }
            Err(error) => {
                warn!(%error, "tunnel bring-up did not complete, scanning without it");
            }
        }
        Ok(())
    }
}
