use std::path::PathBuf;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::routing::{codec::DefaultPoolPolicy, headers::HeaderMapping};

#[derive(Debug, Default)]
pub enum ConfigLoadOption {
    #[default]
    Default,

    Path(PathBuf),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway facade serving `/httproute/{ns}/{name}`.
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RouteTarget {
    pub namespace: String,
    pub name: String,
}

impl Default for RouteTarget {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            name: "sample-route".to_string(),
        }
    }
}

/// Opaque caller identity and bearer credential. Neither is parsed or
/// validated here; both are attached verbatim to requests when present.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    pub user: Option<String>,
    pub token: Option<String>,
}

fn default_pools() -> Vec<String> {
    vec!["blue".to_string(), "green".to_string()]
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub route: RouteTarget,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Pool names accepted as rule targets and as the default pool.
    #[serde(default = "default_pools")]
    pub pools: Vec<String>,

    /// Extra header mappings appended to the shipped translation table.
    #[serde(default)]
    pub headers: Vec<HeaderMapping>,

    /// How the default pool is written to the wire (see the codec docs).
    #[serde(default)]
    pub default_pool_policy: DefaultPoolPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            route: RouteTarget::default(),
            credentials: CredentialsConfig::default(),
            pools: default_pools(),
            headers: Vec::new(),
            default_pool_policy: DefaultPoolPolicy::default(),
        }
    }
}

impl Config {
    pub fn load(option: ConfigLoadOption) -> Result<Self> {
        let figment = Figment::new();

        let config = match option {
            ConfigLoadOption::Default => figment.merge(Serialized::defaults(Self::default())),
            ConfigLoadOption::Path(path) => figment
                .merge(Serialized::defaults(Self::default()))
                .merge(Yaml::file(path)),
        }
        .merge(Env::prefixed("ROUTESHIFT_").split("__"))
        .extract_lossy()?;

        Ok(config)
    }
}
