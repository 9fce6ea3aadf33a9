use std::fmt;

use serde::Serialize;

use crate::customer::{Customer, CustomerId, CustomerStatus};
use crate::server::ServerLabel;

/// Running totals for one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    pub entered: usize,
    pub served: usize,
    pub left: usize,
    pub waited: usize,
    pub total_wait: f64,
}

impl Stats {
    pub fn average_wait(&self) -> f64 {
        if self.served == 0 {
            0.0
        } else {
            self.total_wait / self.served as f64
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            entered: self.entered,
            served: self.served,
            left: self.left,
            waited: self.waited,
            average_wait: self.average_wait(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub entered: usize,
    pub served: usize,
    pub left: usize,
    pub waited: usize,
    pub average_wait: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3} {} {}]", self.average_wait, self.served, self.left)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    pub time: f64,
    pub customer: CustomerId,
    pub status: CustomerStatus,
    pub server: Option<ServerLabel>,
}

impl LogEntry {
    /// Arrivals and departures are logged without a server.
    pub fn new(customer: &Customer, server: Option<ServerLabel>) -> Self {
        let server = match customer.status {
            CustomerStatus::Arrived | CustomerStatus::Left => None,
            _ => server,
        };
        Self {
            time: customer.present_time,
            customer: customer.id,
            status: customer.status,
            server,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {} {}", self.time, self.customer, self.status.keyword())?;
        if let Some(server) = self.server {
            match self.status {
                CustomerStatus::Served => write!(f, " by {}", server)?,
                CustomerStatus::Waiting => write!(f, " to be served by {}", server)?,
                CustomerStatus::Done => write!(f, " serving by {}", server)?,
                CustomerStatus::Arrived | CustomerStatus::Left => {}
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunMetadata {
    pub seed: u64,
    pub servers: usize,
    pub self_checks: usize,
    pub queue_capacity: usize,
    pub arrivals: usize,
    pub end_time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    pub entries: Vec<LogEntry>,
    pub summary: Summary,
    pub metadata: RunMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: CustomerStatus, server: Option<ServerLabel>) -> LogEntry {
        LogEntry {
            time: 1.5,
            customer: 2,
            status,
            server,
        }
    }

    #[test]
    fn log_lines_name_the_server() {
        let human = Some(ServerLabel::Human(1));
        let counter = Some(ServerLabel::SelfCheck(3));
        assert_eq!(entry(CustomerStatus::Arrived, None).to_string(), "1.500 2 arrives");
        assert_eq!(
            entry(CustomerStatus::Served, human).to_string(),
            "1.500 2 served by server 1"
        );
        assert_eq!(
            entry(CustomerStatus::Waiting, counter).to_string(),
            "1.500 2 waits to be served by self-check 3"
        );
        assert_eq!(
            entry(CustomerStatus::Done, human).to_string(),
            "1.500 2 done serving by server 1"
        );
        assert_eq!(entry(CustomerStatus::Left, None).to_string(), "1.500 2 leaves");
    }

    #[test]
    fn summary_defaults_to_zero_wait() {
        let stats = Stats {
            entered: 2,
            left: 2,
            ..Stats::default()
        };
        assert_eq!(stats.summary().to_string(), "[0.000 0 2]");
    }

    #[test]
    fn average_wait_is_over_served() {
        let stats = Stats {
            entered: 3,
            served: 3,
            waited: 2,
            total_wait: 1.5,
            ..Stats::default()
        };
        assert_eq!(stats.summary().to_string(), "[0.500 3 0]");
    }
}
