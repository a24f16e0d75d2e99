use std::env;
use std::sync::{Mutex, OnceLock};

use procura_cli::commands::{demo, doctor, migrate, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(
        &[
            ("PROCURA_DATABASE_URL", "sqlite::memory:"),
            ("PROCURA_DATABASE_MAX_CONNECTIONS", "1"),
        ],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 0, "expected successful migrate run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "migrate");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("PROCURA_DATABASE_URL", "postgres://nope")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_returns_deterministic_scenario_summary() {
    with_env(
        &[
            ("PROCURA_DATABASE_URL", "sqlite::memory:"),
            ("PROCURA_DATABASE_MAX_CONNECTIONS", "1"),
        ],
        || {
            let result = seed::run();
            assert_eq!(result.exit_code, 0, "expected deterministic seed success");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "seed");
            assert_eq!(payload["status"], "ok");

            let message = payload["message"].as_str().unwrap_or("");
            let mid_approval_line =
                "  - mid_approval: req-demo-midapproval-001 (Office supplies - first level approved, awaiting second)";
            let approved_line =
                "  - approved_awaiting_receipt: req-demo-approved-001 (Printer toner - fully approved with issued PO)";
            let rejected_line =
                "  - rejected: req-demo-rejected-001 (Conference travel - rejected at first level)";
            assert!(message.contains(mid_approval_line));
            assert!(message.contains(approved_line));
            assert!(message.contains(rejected_line));
        },
    );
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(
        &[
            ("PROCURA_DATABASE_URL", "sqlite::memory:"),
            ("PROCURA_DATABASE_MAX_CONNECTIONS", "1"),
        ],
        || {
            let first = seed::run();
            assert_eq!(first.exit_code, 0, "expected first seed invocation success");
            let first_payload = parse_payload(&first.output);
            assert_eq!(first_payload["status"], "ok");

            let second = seed::run();
            assert_eq!(second.exit_code, 0, "expected second seed invocation success");
            let second_payload = parse_payload(&second.output);
            assert_eq!(second_payload["status"], "ok");

            assert_eq!(first_payload["message"], second_payload["message"]);
        },
    );
}

#[test]
fn demo_runs_the_workflow_end_to_end() {
    with_env(&[], || {
        let result = demo::run();
        assert_eq!(result.exit_code, 0, "expected successful demo run");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "demo");
        assert_eq!(payload["status"], "pass");

        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks.len(), 6);
        assert!(checks.iter().all(|check| check["status"] == "pass"));
    });
}

#[test]
fn doctor_json_report_parses_and_lists_checks() {
    with_env(
        &[
            ("PROCURA_DATABASE_URL", "sqlite::memory:"),
            ("PROCURA_DATABASE_MAX_CONNECTIONS", "1"),
            ("PROCURA_FILES_MEDIA_ROOT", env!("CARGO_TARGET_TMPDIR")),
        ],
        || {
            let output = doctor::run(true);
            let payload = parse_payload(&output);

            assert_eq!(payload["overall_status"], "pass");
            let checks = payload["checks"].as_array().expect("checks array");
            let names: Vec<&str> =
                checks.iter().filter_map(|check| check["name"].as_str()).collect();
            assert_eq!(
                names,
                ["config_validation", "media_root_writable", "database_connectivity"]
            );
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "PROCURA_DATABASE_URL",
        "PROCURA_DATABASE_MAX_CONNECTIONS",
        "PROCURA_DATABASE_TIMEOUT_SECS",
        "PROCURA_FILES_MEDIA_ROOT",
        "PROCURA_EXTRACTION_MIN_TEXT_LEN",
        "PROCURA_EXTRACTION_MIN_TEXT_WORDS",
        "PROCURA_EXTRACTION_TIMEOUT_SECS",
        "PROCURA_EXTRACTION_OCR_LANGUAGE",
        "PROCURA_RECONCILE_ABSOLUTE_TOLERANCE",
        "PROCURA_RECONCILE_PERCENT_TOLERANCE",
        "PROCURA_RECONCILE_LOW_CONFIDENCE_MULTIPLIER",
        "PROCURA_LOGGING_LEVEL",
        "PROCURA_LOGGING_FORMAT",
        "PROCURA_LOG_LEVEL",
        "PROCURA_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
