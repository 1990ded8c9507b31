// src/core/error.rs

use std::time::Duration;

use thiserror::Error;

/// Failure modes of the scan pipeline.
///
/// Only hard failures live here. A scanner run that finishes without a
/// usable report is not an error at all: the wrapper degrades it to an
/// empty report, and the pipeline yields zero findings. Likewise, status
/// telemetry swallows its own transport failures at the call site.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid scan profile, empty VPN configuration, or any other setting
    /// that makes the scan impossible to even launch. Fatal at the point
    /// raised.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The external scanner process exceeded its execution ceiling. The
    /// wrapper retries these internally; see `ScanError::RetryExhausted`.
    #[error("scanner process exceeded the {0:?} ceiling")]
    Timeout(Duration),

    /// Every retry of a timed-out scan was consumed. This is the only
    /// condition a `scan` call surfaces as a hard failure.
    #[error("scan timed out on all {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    /// Spawning the scanner or touching configuration files failed at the
    /// OS level.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
