//! Suite configuration.
//!
//! The instance list, golden name and input files live here and are handed
//! to the scenario engine explicitly. The file format is TOML; every key is optional
//! and the defaults describe the standard seven-instance bench.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::error::ConfigError;
use crate::dut::process::INSTANCE_PLACEHOLDER;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    /// Name of the trusted reference instance.
    pub golden: String,
    /// Instances to drive; the golden one must be among them.
    pub instances: Vec<String>,
    /// Coefficient configuration files for the signal-processing scenario.
    pub coefficient_configs: Vec<PathBuf>,
    /// Stimulus vector shared by the bypass and signal-processing scenarios.
    pub stimulus: PathBuf,
    /// Power-on-reset expectation table.
    pub por_expected: PathBuf,
    /// Executable template; `{instance}` is replaced by the instance name.
    pub executable: String,
    /// Extra arguments placed before each command, also templated.
    pub executable_args: Vec<String>,
    /// Per-command timeout in milliseconds. Absent means wait forever.
    pub timeout_ms: Option<u64>,
    /// Samples driven by the buffer-overflow scenario.
    pub overflow_samples: usize,
    /// Value of each overflow sample.
    pub overflow_stimulus: u32,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            golden: "golden".to_string(),
            instances: ["golden", "impl0", "impl1", "impl2", "impl3", "impl4", "impl5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            coefficient_configs: ["p0.cfg", "p4.cfg", "p7.cfg", "p9.cfg"]
                .iter()
                .map(PathBuf::from)
                .collect(),
            stimulus: PathBuf::from("sqr.vec"),
            por_expected: PathBuf::from("por.csv"),
            executable: format!("{}.exe", INSTANCE_PLACEHOLDER),
            executable_args: Vec::new(),
            timeout_ms: None,
            overflow_samples: 300,
            overflow_stimulus: 0x10,
            base_dir: PathBuf::from("."),
        }
    }
}

impl SuiteConfig {
    /// Reads and validates a TOML suite file. Relative paths inside it are
    /// resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: SuiteConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::Invalid("no instances configured".into()));
        }
        let mut seen = HashSet::new();
        for name in &self.instances {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("empty instance name".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Invalid(format!("instance '{}' listed twice", name)));
            }
        }
        if !seen.contains(self.golden.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "golden instance '{}' is not in the instance list",
                self.golden
            )));
        }
        if !self.executable.contains(INSTANCE_PLACEHOLDER)
            && !self
                .executable_args
                .iter()
                .any(|a| a.contains(INSTANCE_PLACEHOLDER))
        {
            return Err(ConfigError::Invalid(format!(
                "executable '{}' does not mention {}",
                self.executable, INSTANCE_PLACEHOLDER
            )));
        }
        if self.overflow_samples == 0 {
            return Err(ConfigError::Invalid("overflow_samples must be positive".into()));
        }
        Ok(())
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Keeps only the golden instance and the named candidates, preserving
    /// configured order. Unknown names are reported back.
    pub fn restrict_instances(&mut self, keep: &[String]) -> Result<(), ConfigError> {
        if let Some(unknown) = keep.iter().find(|k| !self.instances.contains(k)) {
            return Err(ConfigError::Invalid(format!("unknown instance '{}'", unknown)));
        }
        let golden = self.golden.clone();
        self.instances.retain(|name| *name == golden || keep.contains(name));
        Ok(())
    }
}
