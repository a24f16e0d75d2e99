use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use procura_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: Vec<(&str, String, Option<&str>)> = vec![
        ("database.url", config.database.url.clone(), Some("PROCURA_DATABASE_URL")),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            Some("PROCURA_DATABASE_MAX_CONNECTIONS"),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            Some("PROCURA_DATABASE_TIMEOUT_SECS"),
        ),
        (
            "files.media_root",
            config.files.media_root.display().to_string(),
            Some("PROCURA_FILES_MEDIA_ROOT"),
        ),
        (
            "extraction.min_text_len",
            config.extraction.min_text_len.to_string(),
            Some("PROCURA_EXTRACTION_MIN_TEXT_LEN"),
        ),
        (
            "extraction.min_text_words",
            config.extraction.min_text_words.to_string(),
            Some("PROCURA_EXTRACTION_MIN_TEXT_WORDS"),
        ),
        (
            "extraction.timeout_secs",
            config.extraction.timeout_secs.to_string(),
            Some("PROCURA_EXTRACTION_TIMEOUT_SECS"),
        ),
        (
            "extraction.ocr_language",
            config.extraction.ocr_language.clone(),
            Some("PROCURA_EXTRACTION_OCR_LANGUAGE"),
        ),
        (
            "reconcile.absolute_tolerance",
            config.reconcile.absolute_tolerance.to_string(),
            Some("PROCURA_RECONCILE_ABSOLUTE_TOLERANCE"),
        ),
        (
            "reconcile.percent_tolerance",
            config.reconcile.percent_tolerance.to_string(),
            Some("PROCURA_RECONCILE_PERCENT_TOLERANCE"),
        ),
        (
            "reconcile.low_confidence_multiplier",
            config.reconcile.low_confidence_multiplier.to_string(),
            Some("PROCURA_RECONCILE_LOW_CONFIDENCE_MULTIPLIER"),
        ),
        ("logging.level", config.logging.level.clone(), Some("PROCURA_LOGGING_LEVEL")),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            Some("PROCURA_LOGGING_FORMAT"),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in fields {
        lines.push(render_line(
            key,
            &value,
            field_source(key, env_key, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("procura.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/procura.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
