use thiserror::Error;

use crate::customer::CustomerId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("at least one server or self-check counter is required")]
    NoServers,
    #[error("arrivals must be greater than 0")]
    ArrivalsZero,
    #[error("{name} must be > 0 (got {value})")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("rest_rate must be > 0 when rest_probability is > 0")]
    RestRateZero,
    #[error("{name} must be within [0, 1] (got {value})")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("missing parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("expected 6, 8, 9 or 10 parameters on stdin (got {0})")]
    ParameterCount(usize),
    #[error("invalid value '{token}' for parameter '{name}'")]
    InvalidParameter { name: &'static str, token: String },
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Cli(String),
    #[error("invariant violated for customer {customer} at time {time:.3}: {violation}")]
    Invariant {
        violation: InvariantViolation,
        customer: CustomerId,
        time: f64,
    },
}

/// Scheduling bugs detected while the engine is running. Each one aborts the
/// run; the engine attaches the offending customer and time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("server {0} is not idle but was asked to serve on arrival")]
    ServerNotIdle(usize),
    #[error("server {0} has customers queued but was asked to serve on arrival")]
    QueueNotEmpty(usize),
    #[error("queue of server {0} is full")]
    QueueFull(usize),
    #[error("server {0} is idle and cannot take a waiting customer")]
    EnqueueOnIdle(usize),
    #[error("self-check {0} cannot rest")]
    SelfCheckRest(usize),
    #[error("unknown server {0}")]
    UnknownServer(usize),
    #[error("no self-check counter is configured")]
    NoSelfCheck,
    #[error("customer has no assigned server")]
    Unassigned,
    #[error("transition '{transition}' is not allowed from status '{from}'")]
    IllegalTransition {
        from: &'static str,
        transition: &'static str,
    },
    #[error("clock went backwards from {from:.3} to {to:.3}")]
    TimeReversed { from: f64, to: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
