// src/core/scanner/wrapper.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::ScanError;
use crate::core::models::ScanReport;
use crate::core::scanner::command::{ScanCommandBuilder, ScanProfile};
use crate::core::scanner::process::{ProcessRunner, SystemProcessRunner};

/// Directory the external scanner treats as its work dir; the JSON
/// report lands here under the file name passed on the command line.
const DEFAULT_OUTPUT_DIR: &str = "/zap/wrk";

/// Hard ceiling for one scanner run. Full scans of slow targets take
/// tens of minutes, so this errs high.
const DEFAULT_SCAN_CEILING: Duration = Duration::from_secs(60 * 60);

/// How often a timed-out scan is retried before giving up.
pub const MAX_SCAN_ATTEMPTS: u32 = 5;

/// Fixed pause between retry attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Owns one configured scanner: command construction, execution with
/// bounded retries, and report recovery.
///
/// Every `scan` call gets a fresh output file, so concurrent wrappers
/// (or retries) never trample each other's reports.
#[derive(Debug)]
pub struct ZapWrapper<R: ProcessRunner = SystemProcessRunner> {
    command: ScanCommandBuilder,
    runner: R,
    output_dir: PathBuf,
    scan_ceiling: Duration,
}

impl ZapWrapper<SystemProcessRunner> {
    /// Configures a wrapper for real scans. Fails fast on an unknown
    /// profile so a bad configuration never reaches scan time.
    pub fn new(
        profile: &str,
        crawl_timeout: Option<u32>,
        proxy: Option<String>,
    ) -> Result<Self, ScanError> {
        Self::with_runner(profile, crawl_timeout, proxy, SystemProcessRunner)
    }
}

impl<R: ProcessRunner> ZapWrapper<R> {
    pub fn with_runner(
        profile: &str,
        crawl_timeout: Option<u32>,
        proxy: Option<String>,
        runner: R,
    ) -> Result<Self, ScanError> {
        let profile = ScanProfile::parse(profile)?;
        Ok(Self {
            command: ScanCommandBuilder::new(profile, crawl_timeout, proxy),
            runner,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            scan_ceiling: DEFAULT_SCAN_CEILING,
        })
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn scan_ceiling(mut self, ceiling: Duration) -> Self {
        self.scan_ceiling = ceiling;
        self
    }

    /// Scans `target` and returns its parsed report.
    ///
    /// Timeouts are retried with a fixed delay; exhausting the retry
    /// budget is the only hard failure. A run that finishes without
    /// leaving a usable report degrades to an empty one, because some
    /// target failures legitimately produce no output at all.
    pub async fn scan(&self, target: &str) -> Result<ScanReport, ScanError> {
        let mut attempt = 1;
        loop {
            let output_file = format!("zap-{}.json", Uuid::new_v4());
            let output_path = self.output_dir.join(&output_file);
            let command = self.command.build(target, &output_file);
            info!(target, attempt, ?command, "running scanner");

            match self.runner.run(&command, self.scan_ceiling).await {
                Ok(outcome) => {
                    debug!(code = ?outcome.status_code, "scanner finished");
                    let report = load_report(&output_path).await;
                    let _ = tokio::fs::remove_file(&output_path).await;
                    return Ok(report);
                }
                Err(ScanError::Timeout(_)) if attempt < MAX_SCAN_ATTEMPTS => {
                    warn!(target, attempt, "scanner timed out, retrying");
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(ScanError::Timeout(_)) => {
                    warn!(target, attempts = attempt, "scanner timed out on every attempt");
                    return Err(ScanError::RetryExhausted { attempts: attempt });
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Reads the report the scanner left behind. Missing, empty or invalid
/// JSON all reduce to "no findings" instead of failing the scan.
async fn load_report(path: &Path) -> ScanReport {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(path = %path.display(), %error, "no scanner report, treating as empty");
            return ScanReport::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(report) => report,
        Err(error) => {
            warn!(path = %path.display(), %error, "unparseable scanner report, treating as empty");
            ScanReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::process::ExitOutcome;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Runner that always exceeds its ceiling.
    struct AlwaysTimedOut {
        calls: Arc<AtomicU32>,
    }

    impl ProcessRunner for AlwaysTimedOut {
        async fn run(&self, _: &[String], ceiling: Duration) -> Result<ExitOutcome, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ScanError::Timeout(ceiling))
        }
    }

    /// Runner that "succeeds" and optionally writes the output file the
    /// command names, the way the real scanner would.
    struct CannedRunner {
        output_dir: PathBuf,
        contents: Option<&'static str>,
    }

    impl ProcessRunner for CannedRunner {
        async fn run(&self, command: &[String], _: Duration) -> Result<ExitOutcome, ScanError> {
            let output_file = command.last().unwrap().clone();
            if let Some(contents) = self.contents {
                tokio::fs::write(self.output_dir.join(output_file), contents)
                    .await
                    .unwrap();
            }
            Ok(ExitOutcome { status_code: Some(0), ..Default::default() })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_retry_five_times_with_fixed_delay_then_fail() {
        let calls = Arc::new(AtomicU32::new(0));
        let wrapper = ZapWrapper::with_runner(
            "baseline",
            None,
            None,
            AlwaysTimedOut { calls: calls.clone() },
        )
        .unwrap();

        let started = tokio::time::Instant::now();
        let result = wrapper.scan("https://ostorlab.co").await;

        assert!(matches!(result, Err(ScanError::RetryExhausted { attempts: 5 })));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // 4 pauses between the 5 attempts on the paused clock.
        assert_eq!(started.elapsed(), RETRY_DELAY * 4);
    }

    #[tokio::test]
    async fn missing_output_file_degrades_to_an_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let wrapper = ZapWrapper::with_runner(
            "baseline",
            None,
            None,
            CannedRunner { output_dir: dir.path().to_path_buf(), contents: None },
        )
        .unwrap()
        .output_dir(dir.path());

        let report = wrapper.scan("https://ostorlab.co").await.unwrap();
        assert_eq!(report, ScanReport::default());
    }

    #[tokio::test]
    async fn corrupt_output_file_degrades_to_an_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let wrapper = ZapWrapper::with_runner(
            "baseline",
            None,
            None,
            CannedRunner { output_dir: dir.path().to_path_buf(), contents: Some("not json {") },
        )
        .unwrap()
        .output_dir(dir.path());

        let report = wrapper.scan("https://ostorlab.co").await.unwrap();
        assert_eq!(report, ScanReport::default());
    }

    #[tokio::test]
    async fn wellformed_output_file_is_parsed_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let wrapper = ZapWrapper::with_runner(
            "baseline",
            None,
            None,
            CannedRunner {
                output_dir: dir.path().to_path_buf(),
                contents: Some(r#"{"site": [{"@name": "https://ostorlab.co", "@host": "ostorlab.co", "@port": "443"}]}"#),
            },
        )
        .unwrap()
        .output_dir(dir.path());

        let report = wrapper.scan("https://ostorlab.co").await.unwrap();
        assert_eq!(report.site.len(), 1);
        assert_eq!(report.site[0].host, "ostorlab.co");
        // the wrapper removes its temporary report file
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn invalid_profile_fails_at_construction() {
        assert!(matches!(
            ZapWrapper::new("random_value", None, None),
            Err(ScanError::Configuration(_))
        ));
    }
}
