//! Layered configuration loading (§10.3): built-in defaults, then
//! `config/<environment>.yaml` for the active environment, then environment
//! variables, in that priority order. CLI flag overrides are merged by the
//! caller before extraction, since flag parsing is binary-specific.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, Result};

pub struct ConfigEngine {
    figment: Figment,
}

impl ConfigEngine {
    pub fn new<D: Serialize>(defaults: &D, environment: &str, env_prefix: &str) -> Self {
        let figment = Figment::from(Serialized::defaults(defaults))
            .merge(Yaml::file(format!("config/{environment}.yaml")))
            .merge(Env::prefixed(env_prefix).split("__"));
        Self { figment }
    }

    pub fn merge(self, provider: impl figment::Provider) -> Self {
        Self {
            figment: self.figment.merge(provider),
        }
    }

    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        self.figment
            .extract()
            .map_err(|e| ConfigError::InternalError(anyhow::anyhow!(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        issuer: String,
        bcrypt_cost: u32,
    }

    #[test]
    fn extracts_defaults_when_no_file_or_env_present() {
        let defaults = Sample {
            issuer: "https://default.example".to_string(),
            bcrypt_cost: 12,
        };
        let engine = ConfigEngine::new(&defaults, "nonexistent-env", "IDENTITY_TEST_ENGINE_UNSET");
        let extracted: Sample = engine.extract().unwrap();
        assert_eq!(extracted, defaults);
    }
}
