//! Differential validation harness for the UAD filter block.
//!
//! Several independently built implementations of the UAD hardware model, plus
//! one trusted golden implementation, are driven through the same command-line
//! DUT interface. This crate provides:
//! - the register model (CSR, COEF and OUTCAP bit layouts)
//! - a device handle that turns high-level operations into DUT commands
//! - loaders for coefficient, power-on-reset and stimulus files
//! - the five validation scenarios and the golden comparator
//! - a report that aggregates per-instance verdicts

pub mod common;
pub mod compare;
pub mod config;
pub mod dut;
pub mod loader;
pub mod regs;
pub mod report;
pub mod scenario;

pub use common::error::{ConfigError, HarnessError, LayoutError, LoadError, TransportError};
pub use config::SuiteConfig;
pub use dut::{DeviceHandle, DutCommand, DutReply, DutTransport, ProcessTransport};
pub use report::Report;
pub use scenario::{ScenarioEngine, ScenarioId, ScenarioKind, ScenarioResult, SuiteInputs, Verdict};
