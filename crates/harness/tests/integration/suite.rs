use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use uad_harness::report::Summary;
use uad_harness::{ScenarioEngine, ScenarioId, ScenarioKind, SuiteConfig, SuiteInputs, Verdict};

use crate::common::{FakeDut, Quirks};

const SUITE: &str = r#"
golden = "golden"
instances = ["golden", "impl0", "impl1"]
coefficient_configs = ["p0.cfg", "p4.cfg", "missing.cfg"]
stimulus = "sqr.vec"
por_expected = "por.csv"
timeout_ms = 500
"#;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn bench() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "suite.toml", SUITE);
    write(dir.path(), "sqr.vec", "0x00\n0x10\n0x20\n0x10\n\n0x00\n");
    write(dir.path(), "por.csv", "register,field,value\ncsr,halt,0\ncoef,c0,0\n");
    write(dir.path(), "p0.cfg", "index,enable,value\n");
    write(dir.path(), "p4.cfg", "index,enable,value\n0,1,0x01\n2,1,0x03\n");
    dir
}

fn fake_bench() -> FakeDut {
    FakeDut::new().with("golden").with("impl0").with_quirks(
        "impl1",
        Quirks {
            counter_wraps: true,
            ..Quirks::default()
        },
    )
}

#[test]
fn test_full_suite_from_config_file() {
    let dir = bench();
    let config = SuiteConfig::from_file(&dir.path().join("suite.toml")).unwrap();
    let inputs = SuiteInputs::load(&config);

    let errors = inputs.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("missing.cfg"));
    assert_eq!(inputs.stimulus.as_ref().unwrap().len(), 5);

    let mut engine = ScenarioEngine::from_config(fake_bench(), &config);
    let report = engine.run(&inputs, &ScenarioKind::ALL).unwrap();

    // Three instances, four single scenarios plus three configurations.
    assert_eq!(
        report.summary(),
        Summary {
            total: 21,
            passed: 17,
            failed: 4,
        }
    );
    assert!(!report.all_passed());

    let overflow = report.find("impl1", &ScenarioId::BufferOverflow).unwrap();
    assert_eq!(overflow.verdict(), Verdict::Fail);
    assert_eq!(overflow.detail(), "IBCNT=44, IBOVF=0");

    let missing = ScenarioId::SignalProcessing {
        config: "missing.cfg".to_string(),
    };
    for instance in ["golden", "impl0", "impl1"] {
        let r = report.find(instance, &missing).unwrap();
        assert_eq!(r.verdict(), Verdict::Fail);
        assert!(r.detail().starts_with("input unavailable: "), "{}", r.detail());
    }

    let p4 = ScenarioId::SignalProcessing {
        config: "p4.cfg".to_string(),
    };
    assert!(report.find("impl1", &p4).unwrap().passed());
    assert_eq!(report.for_instance("impl0").filter(|r| r.passed()).count(), 6);

    let text = report.render_text();
    assert!(text.contains("=== TC3: INPUT BUFFER OVERFLOW ==="));
    assert!(text.ends_with("[*] 17 passed, 4 failed, 21 total\n"));
}

#[test]
fn test_selected_scenarios_only() {
    let dir = bench();
    let config = SuiteConfig::from_file(&dir.path().join("suite.toml")).unwrap();
    let inputs = SuiteInputs::load(&config);

    let mut engine = ScenarioEngine::from_config(fake_bench(), &config);
    let report = engine
        .run(&inputs, &[ScenarioKind::Bypass, ScenarioKind::GlobalEnable])
        .unwrap();

    // Always reported in numeric order.
    let kinds: Vec<ScenarioKind> = report.results().iter().map(|r| r.scenario().kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ScenarioKind::GlobalEnable,
            ScenarioKind::GlobalEnable,
            ScenarioKind::GlobalEnable,
            ScenarioKind::Bypass,
            ScenarioKind::Bypass,
            ScenarioKind::Bypass,
        ]
    );
    assert!(report.all_passed());
    // Nothing was sent for scenarios that were not selected.
    let commands = engine.transport().commands_for("impl1");
    assert!(commands.len() < 20);
}

#[test]
fn test_missing_stimulus_fails_dependent_scenarios() {
    let dir = bench();
    fs::remove_file(dir.path().join("sqr.vec")).unwrap();
    let config = SuiteConfig::from_file(&dir.path().join("suite.toml")).unwrap();
    let inputs = SuiteInputs::load(&config);

    let mut engine = ScenarioEngine::from_config(fake_bench(), &config);
    let report = engine
        .run(&inputs, &[ScenarioKind::PowerOnReset, ScenarioKind::Bypass, ScenarioKind::SignalProcessing])
        .unwrap();

    for r in report.results() {
        match r.scenario().kind() {
            ScenarioKind::PowerOnReset => assert!(r.passed(), "{}", r.detail()),
            _ => {
                assert_eq!(r.verdict(), Verdict::Fail);
                assert!(r.detail().starts_with("input unavailable: "));
            }
        }
    }
}

#[test]
fn test_json_report_shape() {
    let dir = bench();
    let config = SuiteConfig::from_file(&dir.path().join("suite.toml")).unwrap();
    let inputs = SuiteInputs::load(&config);

    let mut engine = ScenarioEngine::from_config(fake_bench(), &config);
    let report = engine.run(&inputs, &[ScenarioKind::BufferOverflow]).unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["summary"]["total"], 3);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["results"][2]["instance"], "impl1");
    assert_eq!(json["results"][2]["verdict"], "FAIL");
    assert_eq!(json["results"][2]["scenario"]["kind"], "buffer_overflow");
}
