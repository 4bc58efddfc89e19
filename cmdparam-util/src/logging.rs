use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to initialize tracing: {source}")]
    TracingFilterFromEnv { #[from] source: tracing_subscriber::filter::FromEnvError },
    #[error("Unable to initialize tracing: {source}")]
    TracingFilterParse { #[from] source: tracing_subscriber::filter::ParseError },
    #[error("Unable to set initialize tracing: {source}")]
    TracingInit { #[from] source: tracing_subscriber::util::TryInitError },
    #[error("Failed to open log file at '{}'", path.display())]
    LogFile { path: PathBuf, #[source] source: std::io::Error },
}

pub fn initialize() -> Result<(), Error> {
    initialize_with_config(LoggingConfig::default())
}

pub fn initialize_with_config(config: LoggingConfig) -> Result<(), Error> {

    let tracing_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("CMDPARAM_LOG")
        .from_env()?
        .add_directive(Directive::from_str("cmdparam=trace")?);

    let logging_layer = config.logging_stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .compact()
    });

    let file_logging_layer =
        if let Some(log_file) = config.file_logging {

            let file = File::create(&log_file)
                .map_err(|source| Error::LogFile { path: log_file, source })?;

            Some(tracing_subscriber::fmt::layer()
                .with_writer(file))
        } else {
            None
        };

    tracing_subscriber::registry()
        .with(tracing_filter)
        .with(logging_layer)
        .with(file_logging_layer)
        .try_init()?;

    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub logging_stdout: bool,
    pub file_logging: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logging_stdout: true,
            file_logging: None,
        }
    }
}

#[cfg(feature = "settings")]
impl LoggingConfig {
    /// Reads `logging.stdout` and the optional `logging.file`. An empty file path disables file logging.
    pub fn load(config: &config::Config) -> Result<Self, LoggingConfigError> {
        let field = "logging.stdout";
        let logging_stdout = config.get_bool(field)
            .map_err(|source| LoggingConfigError::ValueParseError { field: field.to_owned(), source })?;

        let field = "logging.file";
        let file_logging = match config.get_string(field) {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(config::ConfigError::NotFound(_)) => None,
            Err(source) => return Err(LoggingConfigError::ValueParseError { field: field.to_owned(), source }),
        };

        Ok(Self {
            logging_stdout,
            file_logging,
        })
    }
}

#[cfg(feature = "settings")]
#[derive(Debug, thiserror::Error)]
pub enum LoggingConfigError {
    #[error("Failed to read logging configuration value '{field}'")]
    ValueParseError { field: String, #[source] source: config::ConfigError },
}

#[cfg(all(test, feature = "settings"))]
mod tests {
    use googletest::prelude::*;
    use indoc::indoc;

    use super::*;

    fn config_from(toml: &str) -> config::Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .expect("valid TOML")
    }

    #[test]
    fn should_default_to_stdout_logging_only() -> Result<()> {
        let config = LoggingConfig::default();

        assert_that!(config.logging_stdout, eq(true));
        assert_that!(config.file_logging, none());
        Ok(())
    }

    #[test]
    fn should_load_file_logging() -> Result<()> {
        let config = config_from(indoc!(r#"
            [logging]
            stdout = false
            file = "/tmp/cmdparam.log"
        "#));

        let result = LoggingConfig::load(&config)?;

        assert_that!(result.logging_stdout, eq(false));
        assert_that!(result.file_logging, some(eq(PathBuf::from("/tmp/cmdparam.log"))));
        Ok(())
    }

    #[test]
    fn should_treat_an_empty_file_path_as_disabled() -> Result<()> {
        let config = config_from(indoc!(r#"
            [logging]
            stdout = true
            file = ""
        "#));

        let result = LoggingConfig::load(&config)?;

        assert_that!(result.file_logging, none());
        Ok(())
    }

    #[test]
    fn should_fail_without_stdout_flag() -> Result<()> {
        let config = config_from(indoc!(r#"
            [logging]
            file = "/tmp/cmdparam.log"
        "#));

        let result = LoggingConfig::load(&config);

        assert_that!(result, err(matches_pattern!(LoggingConfigError::ValueParseError { field: eq("logging.stdout") })));
        Ok(())
    }

    #[test]
    fn should_initialize_the_global_subscriber_only_once() -> Result<()> {
        let config = LoggingConfig { logging_stdout: false, file_logging: None };

        assert_that!(initialize_with_config(Clone::clone(&config)), ok(anything()));
        assert_that!(initialize_with_config(config), err(matches_pattern!(Error::TracingInit { source: anything() })));
        Ok(())
    }

    #[test]
    fn should_report_unwritable_log_files() -> Result<()> {
        let path = PathBuf::from("/nonexistent-cmdparam-directory/cmdparam.log");
        let config = LoggingConfig { logging_stdout: false, file_logging: Some(Clone::clone(&path)) };

        let result = initialize_with_config(config);

        assert_that!(result, err(matches_pattern!(Error::LogFile { path: eq(path) })));
        Ok(())
    }
}
