// src/core/scanner/mod.rs

// Everything that touches the external scanner process lives here: the
// argument builder, the process seam, the retrying wrapper and the
// optional tunnel setup.
pub mod command;
pub mod process;
pub mod vpn;
pub mod wrapper;

pub use command::ScanProfile;
pub use process::{ProcessRunner, SystemProcessRunner};
pub use vpn::VpnSetup;
pub use wrapper::ZapWrapper;
