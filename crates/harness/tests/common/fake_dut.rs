use std::collections::HashMap;
use std::io;
use std::time::Duration;

use uad_harness::regs::csr;
use uad_harness::regs::{COEF_ADDR, CSR_ADDR, OUTCAP_ADDR};
use uad_harness::{DutCommand, DutReply, DutTransport, TransportError};

/// Defects a fake device can be told to exhibit.
#[derive(Clone, Debug)]
pub struct Quirks {
    /// `enable` turns `fen` on. Cleared to model a broken enable path.
    pub enable_sets_fen: bool,
    /// Registers stay readable while disabled.
    pub readable_when_disabled: bool,
    /// `disable` leaves `fen` set.
    pub fen_stuck_high: bool,
    /// `ibcnt` wraps at 256 instead of saturating.
    pub counter_wraps: bool,
    /// CSR value after reset.
    pub por_csr: u32,
    /// COEF value after reset.
    pub por_coef: u32,
    /// XOR applied to the output of the n-th sample since reset.
    pub corrupt_output: Option<(usize, u32)>,
    /// The n-th sample since reset answers nothing.
    pub drop_output: Option<usize>,
    /// Ignores coefficient enables and always passes input through.
    pub ignores_coefficients: bool,
    /// Never answers anything.
    pub silent: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            enable_sets_fen: true,
            readable_when_disabled: false,
            fen_stuck_high: false,
            counter_wraps: false,
            por_csr: 0,
            por_coef: 0,
            corrupt_output: None,
            drop_output: None,
            ignores_coefficients: false,
            silent: false,
        }
    }
}

/// Behavioural model of one UAD instance.
#[derive(Clone, Debug, Default)]
pub struct FakeDevice {
    pub quirks: Quirks,
    enabled: bool,
    csr: u32,
    coef: u32,
    outcap: u32,
    history: [u32; 4],
    samples_since_reset: usize,
}

impl FakeDevice {
    pub fn new(quirks: Quirks) -> Self {
        let mut dev = Self {
            quirks,
            ..Self::default()
        };
        dev.reset();
        dev
    }

    pub fn csr(&self) -> u32 {
        self.csr
    }

    pub fn coef(&self) -> u32 {
        self.coef
    }

    fn reset(&mut self) {
        self.enabled = false;
        self.csr = self.quirks.por_csr;
        self.coef = self.quirks.por_coef;
        self.outcap = 0;
        self.history = [0; 4];
        self.samples_since_reset = 0;
    }

    fn observable(&self) -> bool {
        !self.quirks.silent && (self.enabled || self.quirks.readable_when_disabled)
    }

    fn write_csr(&mut self, data: u32) {
        let mut value = data;
        if csr::IBCLR.is_set(value) {
            value = csr::IBCNT.insert(value, 0);
            value = csr::IBOVF.insert(value, 0);
            self.history = [0; 4];
        }
        // Clear pulses self-reset.
        value = csr::IBCLR.insert(value, 0);
        value = csr::TCLR.insert(value, 0);
        self.csr = value;
    }

    fn count_sample(&mut self) {
        let count = csr::IBCNT.extract(self.csr);
        if self.quirks.counter_wraps {
            self.csr = csr::IBCNT.insert(self.csr, (count + 1) & 0xFF);
        } else if count == csr::IBCNT.max_value() {
            self.csr = csr::IBOVF.insert(self.csr, 1);
        } else {
            self.csr = csr::IBCNT.insert(self.csr, count + 1);
        }
    }

    fn filter(&mut self, input: u32) -> u32 {
        self.history = [input, self.history[0], self.history[1], self.history[2]];

        let enables: Vec<bool> = csr::COEF_ENABLES.iter().map(|f| f.is_set(self.csr)).collect();
        let active = csr::FEN.is_set(self.csr)
            && !csr::HALT.is_set(self.csr)
            && enables.iter().any(|&e| e)
            && !self.quirks.ignores_coefficients;
        if !active {
            return input;
        }

        (0..4)
            .filter(|&i| enables[i])
            .map(|i| ((self.coef >> (i * 8)) & 0xFF) * self.history[i])
            .fold(0u32, u32::wrapping_add)
            & 0xFFFF
    }

    fn handle(&mut self, command: &DutCommand) -> DutReply {
        if self.quirks.silent {
            return DutReply::Unavailable;
        }
        match *command {
            DutCommand::Reset => {
                self.reset();
                DutReply::Unavailable
            }
            DutCommand::Enable => {
                self.enabled = true;
                if self.quirks.enable_sets_fen {
                    self.csr = csr::FEN.insert(self.csr, 1);
                }
                DutReply::Unavailable
            }
            DutCommand::Disable => {
                self.enabled = false;
                let fen = self.quirks.fen_stuck_high as u32;
                self.csr = csr::FEN.insert(self.csr, fen);
                DutReply::Unavailable
            }
            DutCommand::ReadRegister { address } => {
                if !self.observable() {
                    return DutReply::Unavailable;
                }
                match address {
                    CSR_ADDR => DutReply::Value(self.csr),
                    COEF_ADDR => DutReply::Value(self.coef),
                    OUTCAP_ADDR => DutReply::Value(self.outcap),
                    _ => DutReply::Unavailable,
                }
            }
            DutCommand::WriteRegister { address, data } => {
                if self.enabled {
                    match address {
                        CSR_ADDR => self.write_csr(data),
                        COEF_ADDR => self.coef = data,
                        _ => {}
                    }
                }
                DutReply::Unavailable
            }
            DutCommand::DriveSignal { data } => {
                if !self.enabled {
                    return DutReply::Unavailable;
                }
                let n = self.samples_since_reset;
                self.samples_since_reset += 1;
                self.count_sample();

                let mut out = self.filter(data);
                self.outcap = out & 0xFFFF;
                if let Some((index, mask)) = self.quirks.corrupt_output {
                    if index == n {
                        out ^= mask;
                    }
                }
                if self.quirks.drop_output == Some(n) {
                    return DutReply::Unavailable;
                }
                DutReply::Value(out)
            }
        }
    }
}

/// A bench of fake devices keyed by instance name, with a command log.
#[derive(Debug, Default)]
pub struct FakeDut {
    devices: HashMap<String, FakeDevice>,
    log: Vec<(String, DutCommand)>,
}

impl FakeDut {
    pub fn new() -> Self {
        super::init_logging();
        Self::default()
    }

    /// Adds a conforming device.
    pub fn with(self, instance: &str) -> Self {
        self.with_quirks(instance, Quirks::default())
    }

    pub fn with_quirks(mut self, instance: &str, quirks: Quirks) -> Self {
        self.devices
            .insert(instance.to_string(), FakeDevice::new(quirks));
        self
    }

    pub fn device(&self, instance: &str) -> &FakeDevice {
        &self.devices[instance]
    }

    /// Commands sent to `instance`, in order.
    pub fn commands_for(&self, instance: &str) -> Vec<DutCommand> {
        self.log
            .iter()
            .filter(|(name, _)| name == instance)
            .map(|(_, cmd)| *cmd)
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl DutTransport for FakeDut {
    fn execute(
        &mut self,
        instance: &str,
        command: &DutCommand,
        _timeout: Option<Duration>,
    ) -> DutReply {
        self.log.push((instance.to_string(), *command));
        match self.devices.get_mut(instance) {
            Some(dev) => dev.handle(command),
            None => DutReply::Failed(TransportError::Spawn {
                program: format!("{}.exe", instance),
                source: io::Error::new(io::ErrorKind::NotFound, "no such instance"),
            }),
        }
    }
}
