use influx_client::InfluxConfig;

const DEFAULT_MQTT_PORT: u16 = 1883;

/// The settings of the bridge, loaded once at startup.
///
/// Every component borrows this immutable struct; there is no ambient
/// configuration state.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub influx_url: String,
    pub influx_token: String,
    pub influx_org: String,
    pub influx_bucket: String,
    pub mqtt_host: String,
    pub mqtt_port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Required setting {name} is not set in the environment")]
    MissingSetting { name: &'static str },

    #[error("Invalid value {value:?} for {name}: a port number is expected")]
    InvalidPort { name: &'static str, value: String },
}

impl BridgeConfig {
    /// Load the settings from the environment, reading a `.env` file first
    /// when one is present in the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required =
            |name: &'static str| lookup(name).ok_or(ConfigError::MissingSetting { name });

        let mqtt_port = match lookup("MQTT_PORT") {
            None => DEFAULT_MQTT_PORT,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort {
                name: "MQTT_PORT",
                value,
            })?,
        };

        Ok(BridgeConfig {
            influx_url: required("INFLUX_URL")?,
            influx_token: required("INFLUX_TOKEN")?,
            influx_org: required("INFLUX_ORG")?,
            influx_bucket: required("INFLUX_BUCKET")?,
            mqtt_host: required("MQTT_URL")?,
            mqtt_port,
        })
    }

    pub fn influx_config(&self) -> InfluxConfig {
        InfluxConfig::new(
            &self.influx_url,
            &self.influx_token,
            &self.influx_org,
            &self.influx_bucket,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("INFLUX_URL", "http://localhost:8086"),
            ("INFLUX_TOKEN", "secret"),
            ("INFLUX_ORG", "home"),
            ("INFLUX_BUCKET", "telemetry"),
            ("MQTT_URL", "localhost"),
        ])
    }

    fn lookup(env: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |name| env.get(name).map(|value| value.to_string())
    }

    #[test]
    fn all_settings_loaded() {
        let mut env = full_env();
        env.insert("MQTT_PORT", "8883");

        let config = BridgeConfig::from_lookup(lookup(env)).unwrap();

        assert_eq!(config.influx_url, "http://localhost:8086");
        assert_eq!(config.influx_bucket, "telemetry");
        assert_eq!(config.mqtt_host, "localhost");
        assert_eq!(config.mqtt_port, 8883);
    }

    #[test]
    fn mqtt_port_defaults_to_1883() {
        let config = BridgeConfig::from_lookup(lookup(full_env())).unwrap();

        assert_eq!(config.mqtt_port, 1883);
    }

    #[test]
    fn missing_required_setting_is_fatal() {
        let mut env = full_env();
        env.remove("INFLUX_TOKEN");

        let error = BridgeConfig::from_lookup(lookup(env)).unwrap_err();

        assert_matches!(
            error,
            ConfigError::MissingSetting {
                name: "INFLUX_TOKEN"
            }
        );
    }

    #[test]
    fn unparsable_port_is_fatal() {
        let mut env = full_env();
        env.insert("MQTT_PORT", "not-a-port");

        let error = BridgeConfig::from_lookup(lookup(env)).unwrap_err();

        assert_matches!(error, ConfigError::InvalidPort { name: "MQTT_PORT", .. });
    }
}
