//! Test scenario engine.
//!
//! Five scenarios are run against every configured DUT instance, one
//! instance at a time and always golden first:
//!
//! 1. global enable/disable
//! 2. power-on-reset register values
//! 3. input buffer overflow
//! 4. filter bypass (differential against golden)
//! 5. signal processing, once per coefficient configuration (differential)
//!
//! Each (instance, scenario) pair yields exactly one [`ScenarioResult`].
//! Mismatches are verdicts, not errors: nothing a DUT does aborts the suite.

mod differential;
mod enable;
mod overflow;
mod por;

use std::fmt;
use std::time::Duration;

use log::{error, info};
use serde::Serialize;

use crate::common::Sample;
use crate::common::error::{HarnessError, LoadError};
use crate::config::SuiteConfig;
use crate::dut::{DeviceHandle, DutTransport};
use crate::loader::{self, CoefficientConfig, ExpectedFieldEntry};
use crate::regs;
use crate::report::Report;

/// The five scenario families, numbered as in the test plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScenarioKind {
    GlobalEnable = 1,
    PowerOnReset = 2,
    BufferOverflow = 3,
    Bypass = 4,
    SignalProcessing = 5,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 5] = [
        ScenarioKind::GlobalEnable,
        ScenarioKind::PowerOnReset,
        ScenarioKind::BufferOverflow,
        ScenarioKind::Bypass,
        ScenarioKind::SignalProcessing,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.number() == n)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScenarioKind::GlobalEnable => "GLOBAL ENABLE / DISABLE",
            ScenarioKind::PowerOnReset => "POR REGISTER VALUES",
            ScenarioKind::BufferOverflow => "INPUT BUFFER OVERFLOW",
            ScenarioKind::Bypass => "FILTER BYPASS",
            ScenarioKind::SignalProcessing => "SIGNAL PROCESSING",
        }
    }
}

/// Identifies one scenario run. Signal processing runs once per
/// configuration, so its id carries the configuration name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioId {
    GlobalEnable,
    PowerOnReset,
    BufferOverflow,
    Bypass,
    SignalProcessing { config: String },
}

impl ScenarioId {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioId::GlobalEnable => ScenarioKind::GlobalEnable,
            ScenarioId::PowerOnReset => ScenarioKind::PowerOnReset,
            ScenarioId::BufferOverflow => ScenarioKind::BufferOverflow,
            ScenarioId::Bypass => ScenarioKind::Bypass,
            ScenarioId::SignalProcessing { .. } => ScenarioKind::SignalProcessing,
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        write!(f, "TC{}: {}", kind.number(), kind.title())?;
        if let ScenarioId::SignalProcessing { config } = self {
            write!(f, " [{}]", config)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        })
    }
}

/// Verdict plus human-readable explanation, before it is tied to an
/// instance and scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub detail: String,
}

impl Outcome {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Pass,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Fail,
            detail: detail.into(),
        }
    }
}

/// Verdict for one instance in one scenario. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    instance: String,
    scenario: ScenarioId,
    verdict: Verdict,
    detail: String,
}

impl ScenarioResult {
    pub fn new(instance: impl Into<String>, scenario: ScenarioId, outcome: Outcome) -> Self {
        Self {
            instance: instance.into(),
            scenario,
            verdict: outcome.verdict,
            detail: outcome.detail,
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn scenario(&self) -> &ScenarioId {
        &self.scenario
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// Inputs loaded from disk before any scenario runs.
///
/// Each input keeps its own load result so that a broken file fails only
/// the scenarios that need it.
#[derive(Debug)]
pub struct SuiteInputs {
    pub stimulus: Result<Vec<u32>, LoadError>,
    pub expected: Result<Vec<ExpectedFieldEntry>, LoadError>,
    pub coefficient_configs: Vec<(String, Result<CoefficientConfig, LoadError>)>,
}

impl SuiteInputs {
    pub fn load(config: &SuiteConfig) -> Self {
        let stimulus = loader::load_stimulus(&config.resolve(&config.stimulus));
        let expected = loader::load_expected_fields(&config.resolve(&config.por_expected));
        let coefficient_configs = config
            .coefficient_configs
            .iter()
            .map(|path| {
                let resolved = config.resolve(path);
                (
                    loader::origin_of(path),
                    loader::load_coefficient_config(&resolved),
                )
            })
            .collect();
        Self {
            stimulus,
            expected,
            coefficient_configs,
        }
    }

    /// Every load failure, in file order.
    pub fn errors(&self) -> Vec<&LoadError> {
        let mut errors = Vec::new();
        if let Err(e) = &self.stimulus {
            errors.push(e);
        }
        if let Err(e) = &self.expected {
            errors.push(e);
        }
        for (_, cfg) in &self.coefficient_configs {
            if let Err(e) = cfg {
                errors.push(e);
            }
        }
        errors
    }
}

/// Drives the scenarios over a transport.
pub struct ScenarioEngine<T: DutTransport> {
    transport: T,
    golden: String,
    instances: Vec<String>,
    timeout: Option<Duration>,
    overflow_samples: usize,
    overflow_stimulus: u32,
}

impl<T: DutTransport> ScenarioEngine<T> {
    /// `instances` may list the golden instance anywhere (or not at all);
    /// the engine always drives it first.
    pub fn new(transport: T, golden: &str, instances: &[String]) -> Self {
        let mut ordered = vec![golden.to_string()];
        for name in instances {
            if !ordered.contains(name) {
                ordered.push(name.clone());
            }
        }
        Self {
            transport,
            golden: golden.to_string(),
            instances: ordered,
            timeout: None,
            overflow_samples: 300,
            overflow_stimulus: 0x10,
        }
    }

    pub fn from_config(transport: T, config: &SuiteConfig) -> Self {
        Self::new(transport, &config.golden, &config.instances)
            .with_timeout(config.timeout())
            .with_overflow(config.overflow_samples, config.overflow_stimulus)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_overflow(mut self, samples: usize, stimulus: u32) -> Self {
        self.overflow_samples = samples;
        self.overflow_stimulus = stimulus;
        self
    }

    pub fn golden(&self) -> &str {
        &self.golden
    }

    /// Instances in drive order, golden first.
    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs `f` once per instance with a fresh device handle.
    fn for_each_instance<R>(
        &mut self,
        id: &ScenarioId,
        mut f: impl FnMut(&mut DeviceHandle<'_>) -> R,
    ) -> Vec<(String, R)> {
        let instances = self.instances.clone();
        let mut out = Vec::with_capacity(instances.len());
        for instance in instances {
            info!("{} on {}", id, instance);
            let mut dev =
                DeviceHandle::new(&instance, &mut self.transport).with_timeout(self.timeout);
            let r = f(&mut dev);
            out.push((instance, r));
        }
        out
    }

    fn judge_each(
        &mut self,
        id: ScenarioId,
        f: impl FnMut(&mut DeviceHandle<'_>) -> Outcome,
    ) -> Vec<ScenarioResult> {
        self.for_each_instance(&id, f)
            .into_iter()
            .map(|(instance, outcome)| record(instance, &id, outcome))
            .collect()
    }

    pub fn run_global_enable(&mut self) -> Vec<ScenarioResult> {
        self.judge_each(ScenarioId::GlobalEnable, enable::global_enable)
    }

    pub fn run_power_on_reset(&mut self, expected: &[ExpectedFieldEntry]) -> Vec<ScenarioResult> {
        self.judge_each(ScenarioId::PowerOnReset, |dev| {
            por::power_on_reset(dev, expected)
        })
    }

    pub fn run_buffer_overflow(&mut self) -> Vec<ScenarioResult> {
        let (samples, stimulus) = (self.overflow_samples, self.overflow_stimulus);
        self.judge_each(ScenarioId::BufferOverflow, |dev| {
            overflow::buffer_overflow(dev, samples, stimulus)
        })
    }

    pub fn run_bypass(&mut self, stimulus: &[u32]) -> Vec<ScenarioResult> {
        let id = ScenarioId::Bypass;
        let captures = self.for_each_instance(&id, |dev| differential::capture_bypass(dev, stimulus));
        self.judge_against_golden(&id, captures)
    }

    pub fn run_signal_processing(
        &mut self,
        config: &CoefficientConfig,
        stimulus: &[u32],
    ) -> Vec<ScenarioResult> {
        let id = ScenarioId::SignalProcessing {
            config: config.name.clone(),
        };
        let captures = self.for_each_instance(&id, |dev| {
            differential::capture_configured(dev, &config.entries, stimulus)
        });
        self.judge_against_golden(&id, captures)
    }

    fn judge_against_golden(
        &self,
        id: &ScenarioId,
        captures: Vec<(String, Vec<Sample>)>,
    ) -> Vec<ScenarioResult> {
        // Golden is always driven first.
        let reference = captures
            .iter()
            .find(|(name, _)| *name == self.golden)
            .map(|(_, samples)| samples.clone())
            .unwrap_or_default();
        let usable = differential::reference_usable(&reference);

        captures
            .into_iter()
            .map(|(instance, samples)| {
                let outcome = if instance == self.golden {
                    differential::judge_reference(&samples)
                } else if !usable {
                    Outcome::fail("no golden reference to compare against")
                } else {
                    differential::judge_candidate(&reference, &samples)
                };
                record(instance, id, outcome)
            })
            .collect()
    }

    /// Fails every instance for a scenario that could not start.
    pub fn fail_all(&self, id: &ScenarioId, detail: &str) -> Vec<ScenarioResult> {
        error!("{} aborted: {}", id, detail);
        self.instances
            .iter()
            .map(|instance| ScenarioResult::new(instance.clone(), id.clone(), Outcome::fail(detail)))
            .collect()
    }

    /// Runs the selected scenarios, in numeric order, and collects a report.
    ///
    /// Fails only if the register model itself is inconsistent.
    pub fn run(
        &mut self,
        inputs: &SuiteInputs,
        selection: &[ScenarioKind],
    ) -> Result<Report, HarnessError> {
        regs::validate_layouts()?;

        let mut report = Report::new();
        for kind in ScenarioKind::ALL {
            if !selection.contains(&kind) {
                continue;
            }
            match kind {
                ScenarioKind::GlobalEnable => report.extend(self.run_global_enable()),
                ScenarioKind::PowerOnReset => match &inputs.expected {
                    Ok(expected) => report.extend(self.run_power_on_reset(expected)),
                    Err(e) => report.extend(self.fail_all(&ScenarioId::PowerOnReset, &input_error(e))),
                },
                ScenarioKind::BufferOverflow => report.extend(self.run_buffer_overflow()),
                ScenarioKind::Bypass => match &inputs.stimulus {
                    Ok(stimulus) => report.extend(self.run_bypass(stimulus)),
                    Err(e) => report.extend(self.fail_all(&ScenarioId::Bypass, &input_error(e))),
                },
                ScenarioKind::SignalProcessing => {
                    for (name, config) in &inputs.coefficient_configs {
                        let id = ScenarioId::SignalProcessing {
                            config: name.clone(),
                        };
                        let results = match (config, &inputs.stimulus) {
                            (Ok(config), Ok(stimulus)) => {
                                self.run_signal_processing(config, stimulus)
                            }
                            (Err(e), _) | (_, Err(e)) => self.fail_all(&id, &input_error(e)),
                        };
                        report.extend(results);
                    }
                }
            }
        }
        Ok(report)
    }
}

fn record(instance: String, id: &ScenarioId, outcome: Outcome) -> ScenarioResult {
    info!("{} {}: {} ({})", id, instance, outcome.verdict, outcome.detail);
    ScenarioResult::new(instance, id.clone(), outcome)
}

fn input_error(e: &LoadError) -> String {
    format!("input unavailable: {}", e)
}
