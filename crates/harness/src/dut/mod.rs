//! DUT command interface.
//!
//! Every DUT instance is driven through a synchronous request/response
//! channel: one [`DutCommand`] in, one tagged [`DutReply`] out. The
//! [`DutTransport`] trait is the seam between the scenarios and whatever
//! actually runs the device; [`ProcessTransport`] launches the instance
//! executable per command.

pub mod handle;
pub mod process;

use std::fmt;
use std::time::Duration;

use crate::common::error::TransportError;

pub use handle::DeviceHandle;
pub use process::ProcessTransport;

/// One request to a DUT instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DutCommand {
    Reset,
    Enable,
    Disable,
    ReadRegister { address: u32 },
    WriteRegister { address: u32, data: u32 },
    DriveSignal { data: u32 },
}

impl DutCommand {
    /// Command-line arguments understood by the DUT executables.
    pub fn args(&self) -> Vec<String> {
        let hex = |v: u32| format!("{:#x}", v);
        match *self {
            DutCommand::Reset => vec!["com".into(), "--action".into(), "reset".into()],
            DutCommand::Enable => vec!["com".into(), "--action".into(), "enable".into()],
            DutCommand::Disable => vec!["com".into(), "--action".into(), "disable".into()],
            DutCommand::ReadRegister { address } => {
                vec!["cfg".into(), "--address".into(), hex(address)]
            }
            DutCommand::WriteRegister { address, data } => vec![
                "cfg".into(),
                "--address".into(),
                hex(address),
                "--data".into(),
                hex(data),
            ],
            DutCommand::DriveSignal { data } => vec!["sig".into(), "--data".into(), hex(data)],
        }
    }

    /// Whether the caller expects a numeric answer.
    pub fn expects_value(&self) -> bool {
        matches!(
            self,
            DutCommand::ReadRegister { .. } | DutCommand::DriveSignal { .. }
        )
    }
}

impl fmt::Display for DutCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}

/// Outcome of one command.
#[derive(Debug)]
pub enum DutReply {
    /// The DUT answered with a single numeric token.
    Value(u32),
    /// The command completed but produced no usable value: no output, an
    /// error message, or a malformed token. Expected for writes, and for
    /// reads against a disabled device.
    Unavailable,
    /// The DUT could not be driven at all.
    Failed(TransportError),
}

impl DutReply {
    pub fn value(&self) -> Option<u32> {
        match self {
            DutReply::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Synchronous request/response channel to DUT instances.
///
/// Implementations must not hold more than one outstanding command per
/// instance; the harness never issues commands concurrently.
#[cfg_attr(test, mockall::automock)]
pub trait DutTransport {
    /// Sends `command` to `instance`, giving up after `timeout` if one is set.
    fn execute(&mut self, instance: &str, command: &DutCommand, timeout: Option<Duration>) -> DutReply;
}
