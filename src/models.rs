use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SimConfig {
    pub seed: u64,
    pub servers: usize,
    #[serde(default)]
    pub self_checks: usize,
    pub queue_capacity: usize,
    pub arrivals: usize,
    pub arrival_rate: f64,
    pub service_rate: f64,
    #[serde(default = "default_rest_rate")]
    pub rest_rate: f64,
    #[serde(default)]
    pub rest_probability: f64,
    #[serde(default)]
    pub greedy_probability: f64,
}

impl SimConfig {
    pub fn total_servers(&self) -> usize {
        self.servers + self.self_checks
    }
}

pub(crate) fn default_rest_rate() -> f64 {
    1.0
}
