//! The whitespace-separated console form of a configuration:
//!
//! ```text
//! seed servers qmax arrivals lambda mu                          (6)
//! seed servers qmax arrivals lambda mu rho p_rest               (8)
//! seed servers self_checks qmax arrivals lambda mu rho p_rest   (9)
//! seed servers self_checks qmax arrivals lambda mu rho p_rest p_greedy (10)
//! ```

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::{default_rest_rate, SimConfig};

static WITH_REST: [&str; 8] = [
    "seed",
    "servers",
    "queue_capacity",
    "arrivals",
    "arrival_rate",
    "service_rate",
    "rest_rate",
    "rest_probability",
];

static WITH_SELF_CHECKS: [&str; 10] = [
    "seed",
    "servers",
    "self_checks",
    "queue_capacity",
    "arrivals",
    "arrival_rate",
    "service_rate",
    "rest_rate",
    "rest_probability",
    "greedy_probability",
];

pub fn parse_params(input: &str) -> Result<SimConfig> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let names: &[&'static str] = match tokens.len() {
        6 => &WITH_REST[..6],
        8 => &WITH_REST[..],
        9 => &WITH_SELF_CHECKS[..9],
        10 => &WITH_SELF_CHECKS[..],
        count => return Err(Error::ParameterCount(count)),
    };
    let params = Params { names, tokens };

    Ok(SimConfig {
        seed: params.get("seed")?,
        servers: params.get("servers")?,
        self_checks: params.get_or("self_checks", 0)?,
        queue_capacity: params.get("queue_capacity")?,
        arrivals: params.get("arrivals")?,
        arrival_rate: params.get("arrival_rate")?,
        service_rate: params.get("service_rate")?,
        rest_rate: params.get_or("rest_rate", default_rest_rate())?,
        rest_probability: params.get_or("rest_probability", 0.0)?,
        greedy_probability: params.get_or("greedy_probability", 0.0)?,
    })
}

struct Params<'a> {
    names: &'a [&'static str],
    tokens: Vec<&'a str>,
}

impl Params<'_> {
    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| *candidate == name)
    }

    fn get<T: FromStr>(&self, name: &'static str) -> Result<T> {
        let idx = self.position(name).ok_or(Error::MissingParameter(name))?;
        parse_token(name, self.tokens[idx])
    }

    fn get_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T> {
        match self.position(name) {
            Some(idx) => parse_token(name, self.tokens[idx]),
            None => Ok(default),
        }
    }
}

fn parse_token<T: FromStr>(name: &'static str, token: &str) -> Result<T> {
    token.parse().map_err(|_| Error::InvalidParameter {
        name,
        token: token.to_string(),
    })
}
