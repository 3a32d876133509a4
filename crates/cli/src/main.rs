//! UAD differential validation suite CLI.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;

use uad_harness::config::SuiteConfig;
use uad_harness::dut::ProcessTransport;
use uad_harness::{HarnessError, Report, ScenarioEngine, ScenarioKind, SuiteInputs};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "uad-harness",
    author,
    version,
    about = "Differential validation suite for UAD filter implementations",
    long_about = None,
)]
struct Cli {
    /// Suite description (TOML). Defaults to the standard bench in the
    /// current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario number to run (1-5); repeat to run several. Default: all.
    #[arg(short, long = "scenario", value_parser = clap::value_parser!(u8).range(1..=5))]
    scenarios: Vec<u8>,

    /// Restrict candidates to these instances; golden always runs.
    #[arg(short, long = "instance")]
    instances: Vec<String>,

    /// Per-command timeout in milliseconds, overriding the config.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(report) => process::exit(if report.all_passed() { 0 } else { 1 }),
        Err(e) => {
            eprintln!("\n\x1b[1;31m[!] FATAL:\x1b[0m {}", e);
            process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> Result<Report, HarnessError> {
    let mut config = match &cli.config {
        Some(path) => SuiteConfig::from_file(path)?,
        None => {
            let config = SuiteConfig::default();
            config.validate()?;
            config
        }
    };
    if !cli.instances.is_empty() {
        config.restrict_instances(&cli.instances)?;
    }
    if cli.timeout_ms.is_some() {
        config.timeout_ms = cli.timeout_ms;
    }

    let inputs = SuiteInputs::load(&config);
    for err in inputs.errors() {
        eprintln!("\x1b[1;33m[!] input error:\x1b[0m {}", err);
    }

    let selection: Vec<ScenarioKind> = if cli.scenarios.is_empty() {
        ScenarioKind::ALL.to_vec()
    } else {
        cli.scenarios
            .iter()
            .filter_map(|&n| ScenarioKind::from_number(n))
            .collect()
    };

    let transport = ProcessTransport::new(config.executable.clone())
        .with_leading_args(config.executable_args.clone())
        .with_working_dir(config.base_dir.clone());
    let mut engine = ScenarioEngine::from_config(transport, &config);

    log::info!(
        "[*] Running {} scenario(s) on {} instance(s), golden = {}",
        selection.len(),
        engine.instances().len(),
        engine.golden()
    );
    let report = engine.run(&inputs, &selection)?;

    match cli.format {
        Format::Text => report.print(),
        Format::Json => println!("{}", report.to_json()?),
    }
    Ok(report)
}
