//! Configuration for the Catalog API

use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_products::CatalogSettings;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub catalog: CatalogSettings,
    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let catalog = catalog_from_env()?;
        let run_migrations = env_parse("RUN_MIGRATIONS", false)?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            catalog,
            run_migrations,
        })
    }
}

/// - PAGE_SIZE: defaults to 10
/// - MAX_PAGE_SIZE: defaults to 100
/// - MEDIA_URL: defaults to /media/
fn catalog_from_env() -> Result<CatalogSettings, ConfigError> {
    let defaults = CatalogSettings::default();

    let page_size = env_parse("PAGE_SIZE", defaults.page_size)?;
    let max_page_size = env_parse("MAX_PAGE_SIZE", defaults.max_page_size)?;
    let media_url = env_or_default("MEDIA_URL", &defaults.media_url);

    if page_size == 0 {
        return Err(ConfigError::InvalidValue {
            key: "PAGE_SIZE".to_string(),
            details: "must be at least 1".to_string(),
        });
    }
    if max_page_size < page_size {
        return Err(ConfigError::InvalidValue {
            key: "MAX_PAGE_SIZE".to_string(),
            details: format!("{} is below PAGE_SIZE ({})", max_page_size, page_size),
        });
    }

    Ok(CatalogSettings {
        page_size,
        max_page_size,
        media_url,
    })
}
