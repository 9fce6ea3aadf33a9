use crate::models::SimConfig;
use crate::state::SimulationResult;

pub trait Formatter {
    fn write(&self, result: &SimulationResult) -> String;
}

pub struct HumanFormatter;

pub struct SummaryFormatter;

pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        for entry in &result.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out.push_str(&result.summary.to_string());
        out.push('\n');
        out
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        format!("{}\n", result.summary)
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        match serde_json::to_string_pretty(result) {
            Ok(json) => format!("{}\n", json),
            Err(err) => format!("{}\n", serde_json::json!({ "error": err.to_string() })),
        }
    }
}

pub fn describe_config(config: &SimConfig) -> String {
    format!(
        concat!(
            "Seed: {}\n",
            "Servers: {}\n",
            "Self-checks: {}\n",
            "Queue capacity: {}\n",
            "Arrivals: {}\n",
            "Arrival rate: {}\n",
            "Service rate: {}\n",
            "Rest rate: {}\n",
            "Rest probability: {}\n",
            "Greedy probability: {}\n",
        ),
        config.seed,
        config.servers,
        config.self_checks,
        config.queue_capacity,
        config.arrivals,
        config.arrival_rate,
        config.service_rate,
        config.rest_rate,
        config.rest_probability,
        config.greedy_probability,
    )
}
