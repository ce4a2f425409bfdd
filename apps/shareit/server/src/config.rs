use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Where ShareIt keeps its data, selected by `SHAREIT_STORAGE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Postgres,
    /// Process-local maps, lost on restart
    Memory,
}

/// Application configuration, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub storage: StorageBackend,
    /// Present only for the Postgres backend
    pub database: Option<PostgresConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let storage: StorageBackend = env_parse("SHAREIT_STORAGE", "postgres")?;

        let database = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            storage,
            database,
        })
    }
}
