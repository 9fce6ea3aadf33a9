use std::fs;
use std::io::Read;
use std::path::Path;

use crate::cli::SourceArgs;
use crate::engine::validate_config;
use crate::error::{Error, Result};
use crate::models::{default_rest_rate, SimConfig};
use crate::params::parse_params;

pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

pub fn build_config(source: &SourceArgs) -> Result<SimConfig> {
    build_config_from(source, &mut std::io::stdin())
}

/// Resolves the file or stdin base, applies flag overrides and validates.
pub fn build_config_from(source: &SourceArgs, stdin: &mut dyn Read) -> Result<SimConfig> {
    let base = if let Some(path) = &source.config {
        Some(load_config(path)?)
    } else if source.stdin {
        let mut input = String::new();
        stdin
            .read_to_string(&mut input)
            .map_err(|err| Error::ConfigIo(format!("failed to read stdin: {}", err)))?;
        Some(parse_params(&input)?)
    } else {
        None
    };

    let config = match base {
        Some(mut config) => {
            apply_overrides(&mut config, source);
            config
        }
        None => from_flags(source)?,
    };
    validate_config(&config)?;
    Ok(config)
}

fn from_flags(source: &SourceArgs) -> Result<SimConfig> {
    let self_checks = source.self_checks.unwrap_or(0);
    let servers = match (source.servers, self_checks) {
        (Some(servers), _) => servers,
        (None, 0) => return Err(Error::MissingParameter("servers")),
        (None, _) => 0,
    };
    Ok(SimConfig {
        seed: source.seed.unwrap_or(0),
        servers,
        self_checks,
        queue_capacity: required(source.queue_capacity, "queue-capacity")?,
        arrivals: required(source.arrivals, "arrivals")?,
        arrival_rate: required(source.arrival_rate, "arrival-rate")?,
        service_rate: required(source.service_rate, "service-rate")?,
        rest_rate: source.rest_rate.unwrap_or_else(default_rest_rate),
        rest_probability: source.rest_probability.unwrap_or(0.0),
        greedy_probability: source.greedy_probability.unwrap_or(0.0),
    })
}

fn required<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(Error::MissingParameter(name))
}

fn apply_overrides(config: &mut SimConfig, source: &SourceArgs) {
    if let Some(seed) = source.seed {
        config.seed = seed;
    }
    if let Some(servers) = source.servers {
        config.servers = servers;
    }
    if let Some(self_checks) = source.self_checks {
        config.self_checks = self_checks;
    }
    if let Some(queue_capacity) = source.queue_capacity {
        config.queue_capacity = queue_capacity;
    }
    if let Some(arrivals) = source.arrivals {
        config.arrivals = arrivals;
    }
    if let Some(rate) = source.arrival_rate {
        config.arrival_rate = rate;
    }
    if let Some(rate) = source.service_rate {
        config.service_rate = rate;
    }
    if let Some(rate) = source.rest_rate {
        config.rest_rate = rate;
    }
    if let Some(probability) = source.rest_probability {
        config.rest_probability = probability;
    }
    if let Some(probability) = source.greedy_probability {
        config.greedy_probability = probability;
    }
}
