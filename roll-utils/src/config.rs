use std::{convert::TryInto, path::Path, time::Duration};
use toml::{map::Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollConfig {
    /// Deepest parenthesis nesting accepted by the parser.
    pub max_depth: usize,
    /// Most dice a single expression may roll.
    pub max_dice: u64,
    pub roll_timeout: Duration,
    pub rng_reseed: Duration,
    pub rng_workers: u32,
}

impl Default for RollConfig {
    fn default() -> Self {
        RollConfig {
            max_depth: 64,
            max_dice: 10_000,
            roll_timeout: Duration::from_millis(2000),
            rng_reseed: Duration::from_secs(300),
            rng_workers: 4,
        }
    }
}

/// Reads `key`, writing `default` back into the table when it is missing or below `minimum`.
fn read_integer(config: &mut Map<String, Value>, key: &str, default: u32, minimum: u32) -> u32 {
    match config
        .get(key)
        .and_then(|v| v.as_integer())
        .and_then(|i| i.try_into().ok())
        .filter(|i: &u32| *i >= minimum)
    {
        Some(i) => i,
        None => {
            log::warn!("unable to read {}, overwriting with {}", key, default);
            config.insert(key.to_string(), Value::from(default));
            default
        }
    }
}

impl RollConfig {
    pub fn from_config(config: &mut Map<String, Value>) -> RollConfig {
        let max_depth = read_integer(config, "max_depth", 64, 0) as usize;
        let max_dice = read_integer(config, "max_dice", 10_000, 1).into();
        let roll_timeout = Duration::from_millis(read_integer(config, "roll_timeout_ms", 2000, 1).into());
        let rng_reseed = Duration::from_secs(read_integer(config, "rng_reseed_s", 300, 1).into());
        let rng_workers = read_integer(config, "rng_workers", 4, 1);
        RollConfig {
            max_depth,
            max_dice,
            roll_timeout,
            rng_reseed,
            rng_workers,
        }
    }

    /// Loads the config file, falling back to defaults for everything that can
    /// not be read, and writes the completed config back.
    pub fn load<P: AsRef<Path>>(config_path: P) -> RollConfig {
        let config_path = config_path.as_ref();
        let mut config: Map<String, Value> = match toml::from_slice(&match std::fs::read(config_path) {
            Ok(a) => a,
            Err(e) => {
                log::warn!("Unable to read config file: {}", e);
                vec![]
            }
        }) {
            Ok(a) => a,
            Err(e) => {
                log::warn!("Unable to parse config: {}", e);
                Map::new()
            }
        };
        let roll_config = RollConfig::from_config(&mut config);
        match toml::to_vec(&config) {
            Ok(serialized) => {
                if let Err(e) = std::fs::write(config_path, serialized) {
                    log::error!("Error writing config: {}", e)
                }
            }
            Err(e) => log::error!("Error serializing config: {}", e),
        }
        roll_config
    }
}
