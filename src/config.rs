use crate::adda_board::{DEFAULT_ADC_ADDRESS, DEFAULT_DAC_ADDRESS};
use anyhow::Context;
use log::LevelFilter;
use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/hvac_server.toml";
pub const DEFAULT_PORT: u16 = 60606;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    #[serde(deserialize_with = "level_setting")]
    pub log_level: LevelFilter,
    // pause between mux select and sampling, "0s" disables it
    #[serde(deserialize_with = "duration_setting")]
    pub settle_delay: Duration,
    #[serde(deserialize_with = "duration_setting")]
    pub max_delay: Duration,
    pub i2c_bus: String,
    pub adc_address: u8,
    pub dac_address: u8,
    // BCM numbering
    pub ready_led_pin: u64,
    pub client_led_pin: u64,
}

fn duration_setting<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    parse_setting(deserializer, parse_duration::parse)
}

fn level_setting<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    parse_setting(deserializer, LevelFilter::from_str)
}

// Settings arrive as strings; the offending text is echoed in the error.
fn parse_setting<'de, D, T, E>(
    deserializer: D,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    E: fmt::Display,
{
    let text = String::deserialize(deserializer)?;
    parse(text.trim()).map_err(|e| de::Error::custom(format!("{:?}: {}", text, e)))
}

impl Config {
    /// Reads the `[main]` table of `path` over the built-in defaults. A
    /// missing file is only an error when `required` is set.
    pub fn read_from_file(path: &str, required: bool) -> anyhow::Result<Config> {
        let mut settings = defaults().with_context(|| "Config::read_from_file(): defaults")?;
        settings
            .merge(config::File::with_name(path).required(required))
            .with_context(|| format!("Config::read_from_file(): open file {}", path))?;

        settings
            .get("main")
            .with_context(|| "Config::read_from_file(): deserialize")
    }
}

fn defaults() -> Result<config::Config, config::ConfigError> {
    let mut settings = config::Config::default();
    settings
        .set_default("main.bind_address", "0.0.0.0")?
        .set_default("main.port", i64::from(DEFAULT_PORT))?
        .set_default("main.log_level", "info")?
        .set_default("main.settle_delay", "0s")?
        .set_default("main.max_delay", "30s")?
        .set_default("main.i2c_bus", "/dev/i2c-1")?
        .set_default("main.adc_address", i64::from(DEFAULT_ADC_ADDRESS))?
        .set_default("main.dac_address", i64::from(DEFAULT_DAC_ADDRESS))?
        // board pins 35 and 37
        .set_default("main.ready_led_pin", 19i64)?
        .set_default("main.client_led_pin", 26i64)?;
    Ok(settings)
}
