use std::net::SocketAddr;

use serde::Deserialize;
use snafu::ResultExt;
use url::Url;

use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address")]
    pub host: SocketAddr,
    #[serde(rename = "app_env", default)]
    pub environment: Environment,
    #[serde(rename = "cors_origin")]
    pub cors_origin: Option<Url>,
    #[serde(flatten)]
    pub surreal: SurrealConfig,
    #[serde(flatten)]
    pub views: ViewConfig,
    #[serde(flatten)]
    pub smtp: SmtpConfig,
    #[serde(flatten)]
    pub github: GithubConfig,
    #[serde(flatten)]
    pub indexnow: IndexNowConfig,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        envy::from_env::<Config>().context(ConfigLoadSnafu)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SurrealConfig {
    #[serde(rename = "surreal_url")]
    pub url: Url,
    #[serde(rename = "surreal_namespace", default = "default_namespace")]
    pub namespace: String,
    #[serde(rename = "surreal_database", default = "default_database")]
    pub database: String,
    #[serde(flatten)]
    pub credentials: Option<SurrealCredentials>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SurrealCredentials {
    #[serde(rename = "surreal_username")]
    pub username: String,
    #[serde(rename = "surreal_password")]
    pub password: String,
}

fn default_namespace() -> String {
    "portfolio".to_string()
}

fn default_database() -> String {
    "portfolio".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    /// Seed value for freshly created counters, standing in for views
    /// accumulated before the counter existed.
    #[serde(rename = "view_baseline", default = "default_baseline")]
    pub baseline: i64,
}

fn default_baseline() -> i64 {
    3300
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    #[serde(rename = "smtp_host")]
    pub host: Option<String>,
    #[serde(rename = "smtp_port")]
    pub port: Option<u16>,
    #[serde(rename = "smtp_username")]
    pub username: Option<String>,
    #[serde(rename = "smtp_password")]
    pub password: Option<String>,
    #[serde(rename = "smtp_from")]
    pub from: Option<String>,
    #[serde(rename = "smtp_to")]
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    #[serde(rename = "github_token")]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexNowConfig {
    #[serde(rename = "indexnow_key")]
    pub key: Option<String>,
    #[serde(rename = "indexnow_host", default)]
    pub host: Option<String>,
}
