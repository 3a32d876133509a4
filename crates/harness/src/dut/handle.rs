//! High-level operations against a single DUT instance.

use std::time::Duration;

use log::{debug, warn};

use super::{DutCommand, DutReply, DutTransport};
use crate::common::Sample;
use crate::regs::{
    CoefficientConfigEntry, CoefficientRegister, ControlStatusRegister, OutputCaptureRegister,
    Register, RegisterKind,
};

/// A logical handle bound to one DUT instance.
///
/// The handle holds no device state of its own; every call goes straight to
/// the transport. Reads never fail: transport errors, error text and
/// malformed tokens all come back as `None`, which callers must treat as an
/// ordinary outcome (a disabled device is allowed to answer nothing).
pub struct DeviceHandle<'a> {
    instance: &'a str,
    transport: &'a mut dyn DutTransport,
    timeout: Option<Duration>,
}

impl<'a> DeviceHandle<'a> {
    pub fn new(instance: &'a str, transport: &'a mut dyn DutTransport) -> Self {
        Self {
            instance,
            transport,
            timeout: None,
        }
    }

    /// Bounds every subsequent command by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn instance(&self) -> &str {
        self.instance
    }

    fn send(&mut self, command: DutCommand) -> Option<u32> {
        debug!("[{}] {}", self.instance, command);
        match self.transport.execute(self.instance, &command, self.timeout) {
            DutReply::Value(v) => {
                debug!("[{}] -> {:#x}", self.instance, v);
                Some(v)
            }
            DutReply::Unavailable => {
                if command.expects_value() {
                    debug!("[{}] -> unavailable", self.instance);
                }
                None
            }
            DutReply::Failed(err) => {
                warn!("[{}] {}: {}", self.instance, command, err);
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.send(DutCommand::Reset);
    }

    pub fn enable(&mut self) {
        self.send(DutCommand::Enable);
    }

    pub fn disable(&mut self) {
        self.send(DutCommand::Disable);
    }

    /// Raw value of `kind`, or `None` if the device did not answer.
    pub fn read_register(&mut self, kind: RegisterKind) -> Option<u32> {
        self.send(DutCommand::ReadRegister {
            address: kind.address(),
        })
    }

    pub fn write_register(&mut self, kind: RegisterKind, value: u32) {
        self.send(DutCommand::WriteRegister {
            address: kind.address(),
            data: value,
        });
    }

    fn read<R: Register>(&mut self) -> Option<R> {
        self.read_register(R::KIND).map(R::decode)
    }

    pub fn read_csr(&mut self) -> Option<ControlStatusRegister> {
        self.read()
    }

    pub fn read_coef(&mut self) -> Option<CoefficientRegister> {
        self.read()
    }

    pub fn read_outcap(&mut self) -> Option<OutputCaptureRegister> {
        self.read()
    }

    pub fn write_csr(&mut self, csr: &ControlStatusRegister) {
        self.write_register(RegisterKind::Csr, csr.encode());
    }

    pub fn write_coef(&mut self, coef: &CoefficientRegister) {
        self.write_register(RegisterKind::Coef, coef.encode());
    }

    /// Sets halt and pulses the buffer and timer clears.
    ///
    /// Does nothing if the CSR cannot be read, rather than writing back a
    /// guessed value.
    pub fn halt(&mut self) -> bool {
        self.modify_csr(ControlStatusRegister::request_halt)
    }

    /// Clears halt and sets `fen`. Same no-op policy as [`Self::halt`].
    pub fn run(&mut self) -> bool {
        self.modify_csr(ControlStatusRegister::request_run)
    }

    fn modify_csr(&mut self, f: impl FnOnce(&mut ControlStatusRegister)) -> bool {
        match self.read_csr() {
            Some(mut csr) => {
                f(&mut csr);
                self.write_csr(&csr);
                true
            }
            None => {
                warn!("[{}] CSR unreadable, skipping update", self.instance);
                false
            }
        }
    }

    /// Loads a coefficient configuration: packs COEF from `entries`, toggles
    /// the matching `cNen` bits in the CSR, and writes both.
    ///
    /// COEF is always written. The CSR is only written if it could be read
    /// first; the return value says whether it was.
    pub fn apply_coefficients(&mut self, entries: &[CoefficientConfigEntry]) -> bool {
        let csr = self.read_csr();
        self.write_coef(&CoefficientRegister::from_entries(entries));
        match csr {
            Some(mut csr) => {
                csr.apply_enables(entries);
                self.write_csr(&csr);
                true
            }
            None => {
                warn!(
                    "[{}] CSR unreadable, coefficient enables not applied",
                    self.instance
                );
                false
            }
        }
    }

    pub fn drive_signal(&mut self, value: u32) -> Sample {
        self.send(DutCommand::DriveSignal { data: value })
    }

    /// Drives every stimulus sample in order and collects the outputs.
    pub fn drive_sequence(&mut self, stimulus: &[u32]) -> Vec<Sample> {
        stimulus.iter().map(|&v| self.drive_signal(v)).collect()
    }
}
