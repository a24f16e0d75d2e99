use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub files: FilesConfig,
    pub extraction: ExtractionConfig,
    pub reconcile: ReconcileConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct FilesConfig {
    pub media_root: PathBuf,
}

/// Knobs for the tiered extractor. The text-quality gate decides when the
/// machine-readable tier is trusted; below it the OCR tier takes over.
#[derive(Clone, Debug)]
pub struct ExtractionConfig {
    pub min_text_len: usize,
    pub min_text_words: usize,
    pub timeout_secs: u64,
    pub ocr_language: String,
}

/// Reconciliation tolerances. The effective tolerance is
/// max(absolute, po_total * percent / 100), widened by the multiplier when
/// extraction confidence is low.
#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    pub absolute_tolerance: Decimal,
    pub percent_tolerance: Decimal,
    pub low_confidence_multiplier: Decimal,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub media_root: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://procura.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            files: FilesConfig { media_root: PathBuf::from("media") },
            extraction: ExtractionConfig {
                min_text_len: 50,
                min_text_words: 10,
                timeout_secs: 20,
                ocr_language: "eng".to_string(),
            },
            reconcile: ReconcileConfig {
                absolute_tolerance: Decimal::new(1, 2),
                percent_tolerance: Decimal::ZERO,
                low_confidence_multiplier: Decimal::new(20, 1),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("procura.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(files) = patch.files {
            if let Some(media_root) = files.media_root {
                self.files.media_root = PathBuf::from(media_root);
            }
        }

        if let Some(extraction) = patch.extraction {
            if let Some(min_text_len) = extraction.min_text_len {
                self.extraction.min_text_len = min_text_len;
            }
            if let Some(min_text_words) = extraction.min_text_words {
                self.extraction.min_text_words = min_text_words;
            }
            if let Some(timeout_secs) = extraction.timeout_secs {
                self.extraction.timeout_secs = timeout_secs;
            }
            if let Some(ocr_language) = extraction.ocr_language {
                self.extraction.ocr_language = ocr_language;
            }
        }

        if let Some(reconcile) = patch.reconcile {
            if let Some(absolute_tolerance) = reconcile.absolute_tolerance {
                self.reconcile.absolute_tolerance = absolute_tolerance;
            }
            if let Some(percent_tolerance) = reconcile.percent_tolerance {
                self.reconcile.percent_tolerance = percent_tolerance;
            }
            if let Some(multiplier) = reconcile.low_confidence_multiplier {
                self.reconcile.low_confidence_multiplier = multiplier;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PROCURA_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("PROCURA_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("PROCURA_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("PROCURA_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("PROCURA_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROCURA_FILES_MEDIA_ROOT") {
            self.files.media_root = PathBuf::from(value);
        }

        if let Some(value) = read_env("PROCURA_EXTRACTION_MIN_TEXT_LEN") {
            self.extraction.min_text_len =
                parse_usize("PROCURA_EXTRACTION_MIN_TEXT_LEN", &value)?;
        }
        if let Some(value) = read_env("PROCURA_EXTRACTION_MIN_TEXT_WORDS") {
            self.extraction.min_text_words =
                parse_usize("PROCURA_EXTRACTION_MIN_TEXT_WORDS", &value)?;
        }
        if let Some(value) = read_env("PROCURA_EXTRACTION_TIMEOUT_SECS") {
            self.extraction.timeout_secs = parse_u64("PROCURA_EXTRACTION_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("PROCURA_EXTRACTION_OCR_LANGUAGE") {
            self.extraction.ocr_language = value;
        }

        if let Some(value) = read_env("PROCURA_RECONCILE_ABSOLUTE_TOLERANCE") {
            self.reconcile.absolute_tolerance =
                parse_decimal("PROCURA_RECONCILE_ABSOLUTE_TOLERANCE", &value)?;
        }
        if let Some(value) = read_env("PROCURA_RECONCILE_PERCENT_TOLERANCE") {
            self.reconcile.percent_tolerance =
                parse_decimal("PROCURA_RECONCILE_PERCENT_TOLERANCE", &value)?;
        }
        if let Some(value) = read_env("PROCURA_RECONCILE_LOW_CONFIDENCE_MULTIPLIER") {
            self.reconcile.low_confidence_multiplier =
                parse_decimal("PROCURA_RECONCILE_LOW_CONFIDENCE_MULTIPLIER", &value)?;
        }

        let log_level =
            read_env("PROCURA_LOGGING_LEVEL").or_else(|| read_env("PROCURA_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PROCURA_LOGGING_FORMAT").or_else(|| read_env("PROCURA_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(media_root) = overrides.media_root {
            self.files.media_root = media_root;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_files(&self.files)?;
        validate_extraction(&self.extraction)?;
        validate_reconcile(&self.reconcile)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("procura.toml"), PathBuf::from("config/procura.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_files(files: &FilesConfig) -> Result<(), ConfigError> {
    if files.media_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation("files.media_root must not be empty".to_string()));
    }
    Ok(())
}

fn validate_extraction(extraction: &ExtractionConfig) -> Result<(), ConfigError> {
    if extraction.timeout_secs == 0 || extraction.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "extraction.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if extraction.ocr_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "extraction.ocr_language must not be empty (e.g. `eng`)".to_string(),
        ));
    }

    Ok(())
}

fn validate_reconcile(reconcile: &ReconcileConfig) -> Result<(), ConfigError> {
    if reconcile.absolute_tolerance < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "reconcile.absolute_tolerance must not be negative".to_string(),
        ));
    }

    if reconcile.percent_tolerance < Decimal::ZERO
        || reconcile.percent_tolerance > Decimal::new(100, 0)
    {
        return Err(ConfigError::Validation(
            "reconcile.percent_tolerance must be in range 0..=100".to_string(),
        ));
    }

    if reconcile.low_confidence_multiplier < Decimal::ONE {
        return Err(ConfigError::Validation(
            "reconcile.low_confidence_multiplier must be at least 1 (it only widens tolerance)"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    files: Option<FilesPatch>,
    extraction: Option<ExtractionPatch>,
    reconcile: Option<ReconcilePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FilesPatch {
    media_root: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractionPatch {
    min_text_len: Option<usize>,
    min_text_words: Option<usize>,
    timeout_secs: Option<u64>,
    ocr_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReconcilePatch {
    absolute_tolerance: Option<Decimal>,
    percent_tolerance: Option<Decimal>,
    low_confidence_multiplier: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
