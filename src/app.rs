// src/app.rs

use std::io::Write;

use regex::Regex;
use tracing::{info, warn};

use crate::core::error::ScanError;
use crate::core::models::Vulnerability;
use crate::core::normalizer;
use crate::core::scanner::process::ProcessRunner;
use crate::core::scanner::vpn::VpnSetup;
use crate::core::scanner::wrapper::ZapWrapper;
use crate::core::telemetry::{StatusLevel, StatusTracker};

/// Narrow interface the pipeline pushes normalized findings through.
/// The host decides what "reporting" means; the pipeline only calls this.
pub trait ReportSink {
    fn report(&mut self, vulnerability: &Vulnerability);
}

/// Writes one JSON object per finding, one finding per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn report(&mut self, vulnerability: &Vulnerability) {
        match serde_json::to_string(vulnerability) {
            Ok(line) => {
                if let Err(error) = writeln!(self.writer, "{line}") {
                    warn!(%error, "finding could not be written");
                }
            }
            Err(error) => warn!(%error, "finding could not be serialized"),
        }
    }
}

/// How a bare domain-name target resolves to a scannable URL.
#[derive(Debug, Clone)]
pub struct TargetSettings {
    pub https: bool,
    pub port: u16,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self { https: true, port: 443 }
    }
}

/// Resolves the scan target: full URLs pass through untouched, bare
/// domain names pick up scheme and port, with the default ports elided.
pub fn prepare_target(input: &str, settings: &TargetSettings) -> String {
    if input.contains("://") {
        return input.to_string();
    }
    match (settings.https, settings.port) {
        (true, 443) => format!("https://{input}"),
        (true, port) => format!("https://{input}:{port}"),
        (false, 80) => format!("http://{input}"),
        (false, port) => format!("http://{input}:{port}"),
    }
}

/// Raw configuration text for the optional scan tunnel.
#[derive(Debug, Clone)]
pub struct VpnConfig {
    pub tunnel: String,
    pub dns: String,
}

/// Wires the whole pipeline together: tunnel, scope gate, scan,
/// normalization and finding dispatch.
pub struct App<R: ProcessRunner + Clone, S: ReportSink> {
    runner: R,
    wrapper: ZapWrapper<R>,
    vpn: VpnSetup,
    vpn_config: Option<VpnConfig>,
    scope: Option<Regex>,
    target_settings: TargetSettings,
    tracker: Option<StatusTracker>,
    sink: S,
}

impl<R: ProcessRunner + Clone, S: ReportSink> App<R, S> {
    pub fn new(wrapper: ZapWrapper<R>, runner: R, sink: S) -> Self {
        Self {
            runner,
            wrapper,
            vpn: VpnSetup::default(),
            vpn_config: None,
            scope: None,
            target_settings: TargetSettings::default(),
            tracker: None,
            sink,
        }
    }

    pub fn scope(mut self, scope: Option<Regex>) -> Self {
        self.scope = scope;
        self
    }

    pub fn target_settings(mut self, settings: TargetSettings) -> Self {
        self.target_settings = settings;
        self
    }

    pub fn vpn_config(mut self, config: Option<VpnConfig>) -> Self {
        self.vpn_config = config;
        self
    }

    pub fn tracker(mut self, tracker: Option<StatusTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    /// Runs one full scan of `target_input` and returns how many
    /// findings reached the sink.
    ///
    /// An out-of-scope target is a skip, not an error. Configuration
    /// problems and an exhausted retry budget are the only hard
    /// failures; both are status-tracked before they propagate.
    pub async fn run(&mut self, target_input: &str) -> Result<usize, ScanError> {
        if let Some(config) = self.vpn_config.clone()
            && let Err(error) = self.vpn.bring_up(&self.runner, &config.tunnel, &config.dns).await
        {
            self.track("vpn", StatusLevel::Error, &error.to_string()).await;
            return Err(error);
        }

        let target = prepare_target(target_input, &self.target_settings);
        if !normalizer::matches_scope(self.scope.as_ref(), &target) {
            warn!(target, "target does not match the scope pattern, not scanning");
            return Ok(0);
        }

        info!(target, "scanning target");
        let report = match self.wrapper.scan(&target).await {
            Ok(report) => report,
            Err(error) => {
                self.track("scan", StatusLevel::Error, &error.to_string()).await;
                return Err(error);
            }
        };

        let mut count = 0;
        for vulnerability in normalizer::normalize(report, self.scope.as_ref()) {
            self.sink.report(&vulnerability);
            count += 1;
        }
        info!(count, "scan finished");
        self.track("scan", StatusLevel::Success, &format!("{count} findings")).await;
        Ok(count)
    }

    async fn track(&self, action: &str, level: StatusLevel, message: &str) {
        if let Some(tracker) = &self.tracker {
            tracker.add_status(action, level, message).await;
        }
    }
}
