use std::fmt::Debug;
use std::path::PathBuf;

pub use config::{Config, ConfigError, FileFormat};
use home::home_dir;
use serde::Deserialize;
use tracing::debug;

use cmdparam_types::definition::{ParameterDefinition, ParameterDefinitionBuilder};
use cmdparam_types::rendering::RenderingDefaults;
use cmdparam_types::types::TypeRegistry;

/// Configuration shipped with the crate, loaded as the lowest layer by [`load_engine_config`].
pub const DEFAULT_CONFIG: &str = include_str!("../cmdparam.toml");

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),
    #[error("Error while retrieving configured value for '{field}'")]
    ReadField { field: &'static str, #[source] source: Box<ConfigError> },
    #[error("Failed to parse field '{field}' with value '{value}'")]
    ParseValue { field: &'static str, value: String, #[source] source: Box<dyn std::error::Error + Send + Sync> },
}

#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_files_used: Vec<PathBuf>,
    pub config_files_declared: Vec<PathBuf>,
}

/// Load configuration from files and environment variables.
///
/// This includes in following order:
/// * A default configuration, provided as a string
/// * The file named by the optional environment variable `CMDPARAM_{NAME}_CUSTOM_CONFIG_PATH`
/// * A system configuration, read from `/etc/cmdparam/{name}.toml`
/// * A user configuration, read from `[XDG_CONFIG_HOME|~/.config]/cmdparam/{name}/config.toml`
/// * Environment variables prefixed with `CMDPARAM_{NAME}_`
/// * The `overrides` passed as parameter.
///
/// There is no development configuration layer, since the crate is not run from a project checkout.
///
pub fn load_config(name: &str, defaults: &str, defaults_format: FileFormat, overrides: Config) -> Result<LoadedConfig, LoadError> {

    let system_config = format!("/etc/cmdparam/{name}.toml");
    let user_config = format!("cmdparam/{name}/config.toml");

    let builder = Config::builder()
        .add_source(config::File::from_str(defaults, defaults_format));

    let mut config_files = Vec::new();

    let name_upper_case = name.to_uppercase();
    let custom_config_path_env_key = format!("CMDPARAM_{name_upper_case}_CUSTOM_CONFIG_PATH");
    if let Ok(config_path) = std::env::var(custom_config_path_env_key) {
        config_files.push(Some(PathBuf::from(config_path)));
    }

    config_files.push(Some(PathBuf::from(system_config)));

    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config_home) => {
            config_files.push(Some(PathBuf::from(xdg_config_home).join(user_config)));
        }
        Err(_) => {
            config_files.push(home_dir().map(|path| path.join(".config").join(user_config)));
        }
    }

    let (sources_used, sources_declared): (Vec<PathBuf>, Vec<PathBuf>) = config_files.into_iter()
        .fold((Vec::new(), Vec::new()), |(mut used, mut declared), path| {
            if let Some(path) = path {
                declared.push(Clone::clone(&path));
                if path.exists() && path.is_file() {
                    used.push(path);
                }
            }
            (used, declared)
        });

    let builder = sources_used.iter()
        .cloned()
        .fold(builder, |builder, path| {
            builder.add_source(config::File::from(path).required(false))
        });

    let builder = builder.add_source(
        config::Environment::with_prefix(&format!("CMDPARAM_{name_upper_case}"))
            .separator("_")
            .try_parsing(true)
    );

    let settings = builder.add_source(overrides);

    Ok(LoadedConfig {
        config: settings.build()?,
        config_files_used: sources_used,
        config_files_declared: sources_declared,
    })
}

/// Loads the `engine` configuration on top of [`DEFAULT_CONFIG`].
pub fn load_engine_config(overrides: Config) -> Result<LoadedConfig, LoadError> {
    load_config("engine", DEFAULT_CONFIG, FileFormat::Toml, overrides)
}

#[derive(Debug, Deserialize)]
struct TypeAlias {
    alias: String,
    #[serde(rename = "type")]
    type_name: String,
}

/// Type aliases and rendering dimensions applied when definitions are built.
#[derive(Clone, Debug, Default)]
pub struct EngineSettings {
    pub registry: TypeRegistry,
    pub rendering: RenderingDefaults,
}

impl EngineSettings {

    pub fn load(config: &Config) -> Result<Self, LoadError> {
        let field = "types.aliases";
        let aliases = match config.get::<Vec<TypeAlias>>(field) {
            Ok(aliases) => aliases,
            Err(ConfigError::NotFound(_)) => Vec::new(),
            Err(source) => return Err(LoadError::ReadField { field, source: Box::new(source) }),
        };

        let alias_count = aliases.len();
        let mut registry = TypeRegistry::default();
        for TypeAlias { alias, type_name } in aliases {
            registry.register_alias(Clone::clone(&alias), &type_name)
                .map_err(|cause| LoadError::ParseValue {
                    field,
                    value: format!("{alias} = {type_name}"),
                    source: Box::new(cause),
                })?;
        }
        debug!("Loaded {alias_count} type aliases.");

        let field = "rendering";
        let rendering = match config.get::<RenderingDefaults>(field) {
            Ok(rendering) => rendering,
            Err(ConfigError::NotFound(_)) => RenderingDefaults::default(),
            Err(source) => return Err(LoadError::ReadField { field, source: Box::new(source) }),
        };

        Ok(Self { registry, rendering })
    }

    /// Starts a definition which resolves its type through the configured aliases and renders with the configured dimensions.
    pub fn definition_builder(&self, name: impl Into<String>, type_name: impl Into<String>) -> ParameterDefinitionBuilder<'_> {
        ParameterDefinition::builder(name, type_name)
            .rendering_defaults(self.rendering)
            .registry(&self.registry)
    }
}
