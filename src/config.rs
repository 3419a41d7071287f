//! Runtime configuration.
//!
//! Every recognized option is enumerated here and populated from the
//! process environment at CLI parse time (clap `env` attributes), keeping
//! the deployed env-variable surface while making the option set
//! explicit. Nothing below this layer reads the environment: components
//! receive these structs at construction.

use std::path::PathBuf;

use clap::Args;

/// Full runtime configuration, assembled by the CLI.
#[derive(Clone, Debug)]
pub struct Config {
    /// Workspace root holding `id_list.txt` and the artifact directories.
    pub workspace: PathBuf,
    pub store: StoreConfig,
    pub service: ServiceConfig,
}

/// Lookup store connection parameters.
#[derive(Args, Clone, Debug)]
pub struct StoreConfig {
    /// Database host.
    #[arg(long = "db-host", env = "DB_HOST")]
    pub host: String,

    /// Database port.
    #[arg(long = "db-port", env = "DB_PORT", default_value_t = 5432)]
    pub port: u16,

    /// Database name.
    #[arg(long = "db-name", env = "DB_NAME")]
    pub dbname: String,

    /// Database user.
    #[arg(long = "db-user", env = "DB_USER")]
    pub user: String,

    /// Database password.
    #[arg(id = "db_password", long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Remote image service endpoint and login credentials.
#[derive(Args, Clone, Debug)]
pub struct ServiceConfig {
    /// Base URL of the image service.
    #[arg(long = "api-base-url", env = "API_BASE_URL")]
    pub base_url: String,

    /// Login email.
    #[arg(long = "login-email", env = "LOGIN_EMAIL")]
    pub email: String,

    /// Login password.
    #[arg(id = "login_password", long = "login-password", env = "LOGIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Client version tag sent with the login exchange.
    #[arg(id = "login_version", long = "login-version", env = "LOGIN_VERSION")]
    pub version: String,

    /// Client OS tag sent with the login exchange.
    #[arg(long = "login-os", env = "LOGIN_OS")]
    pub os: String,
}
