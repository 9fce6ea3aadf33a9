use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use crate::error::{Error, Result};
use crate::models::SimConfig;

/// The random quantities the engine consumes. Implementations must be
/// deterministic for a given seed.
pub trait VariateSource {
    fn next_inter_arrival_gap(&mut self) -> f64;
    fn next_service_duration(&mut self) -> f64;
    /// Uniform in `[0, 1)`; compared against the rest probability.
    fn next_rest_trigger(&mut self) -> f64;
    fn next_rest_duration(&mut self) -> f64;
    /// Uniform in `[0, 1)`; compared against the greedy probability.
    fn next_customer_type_draw(&mut self) -> f64;
}

/// Five independent streams, one per quantity, so that drawing one quantity
/// never shifts the sequence of another.
pub struct SeededVariates {
    arrivals: StdRng,
    service: StdRng,
    rest_trigger: StdRng,
    rest_duration: StdRng,
    customer_type: StdRng,
    arrival_distr: Exp<f64>,
    service_distr: Exp<f64>,
    rest_distr: Exp<f64>,
}

impl SeededVariates {
    pub fn new(seed: u64, arrival_rate: f64, service_rate: f64, rest_rate: f64) -> Result<Self> {
        Ok(Self {
            arrivals: StdRng::seed_from_u64(seed),
            service: StdRng::seed_from_u64(seed.wrapping_add(1)),
            rest_trigger: StdRng::seed_from_u64(seed.wrapping_add(2)),
            rest_duration: StdRng::seed_from_u64(seed.wrapping_add(3)),
            customer_type: StdRng::seed_from_u64(seed.wrapping_add(4)),
            arrival_distr: exp("arrival_rate", arrival_rate)?,
            service_distr: exp("service_rate", service_rate)?,
            rest_distr: exp("rest_rate", rest_rate)?,
        })
    }

    pub fn from_config(config: &SimConfig) -> Result<Self> {
        Self::new(
            config.seed,
            config.arrival_rate,
            config.service_rate,
            config.rest_rate,
        )
    }
}

fn exp(name: &'static str, rate: f64) -> Result<Exp<f64>> {
    Exp::new(rate).map_err(|_| Error::InvalidRate { name, value: rate })
}

impl VariateSource for SeededVariates {
    fn next_inter_arrival_gap(&mut self) -> f64 {
        self.arrival_distr.sample(&mut self.arrivals)
    }

    fn next_service_duration(&mut self) -> f64 {
        self.service_distr.sample(&mut self.service)
    }

    fn next_rest_trigger(&mut self) -> f64 {
        self.rest_trigger.gen::<f64>()
    }

    fn next_rest_duration(&mut self) -> f64 {
        self.rest_distr.sample(&mut self.rest_duration)
    }

    fn next_customer_type_draw(&mut self) -> f64 {
        self.customer_type.gen::<f64>()
    }
}

/// Returns the same value for every draw of a quantity. Handy for replaying
/// hand-checked scenarios.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedVariates {
    pub inter_arrival_gap: f64,
    pub service_duration: f64,
    pub rest_trigger: f64,
    pub rest_duration: f64,
    pub customer_type_draw: f64,
}

impl FixedVariates {
    /// Nobody rests and nobody is greedy.
    pub fn new(inter_arrival_gap: f64, service_duration: f64) -> Self {
        Self {
            inter_arrival_gap,
            service_duration,
            rest_trigger: 1.0,
            rest_duration: 0.0,
            customer_type_draw: 1.0,
        }
    }
}

impl VariateSource for FixedVariates {
    fn next_inter_arrival_gap(&mut self) -> f64 {
        self.inter_arrival_gap
    }

    fn next_service_duration(&mut self) -> f64 {
        self.service_duration
    }

    fn next_rest_trigger(&mut self) -> f64 {
        self.rest_trigger
    }

    fn next_rest_duration(&mut self) -> f64 {
        self.rest_duration
    }

    fn next_customer_type_draw(&mut self) -> f64 {
        self.customer_type_draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_sequence() {
        let mut a = SeededVariates::new(7, 1.0, 2.0, 0.5).unwrap();
        let mut b = SeededVariates::new(7, 1.0, 2.0, 0.5).unwrap();
        for _ in 0..16 {
            assert_eq!(a.next_inter_arrival_gap(), b.next_inter_arrival_gap());
            assert_eq!(a.next_service_duration(), b.next_service_duration());
            assert_eq!(a.next_rest_trigger(), b.next_rest_trigger());
            assert_eq!(a.next_rest_duration(), b.next_rest_duration());
            assert_eq!(a.next_customer_type_draw(), b.next_customer_type_draw());
        }
    }

    #[test]
    fn streams_are_independent() {
        let mut a = SeededVariates::new(3, 1.0, 1.0, 1.0).unwrap();
        let mut b = SeededVariates::new(3, 1.0, 1.0, 1.0).unwrap();
        for _ in 0..5 {
            b.next_service_duration();
            b.next_rest_trigger();
        }
        let gaps_a: Vec<f64> = (0..5).map(|_| a.next_inter_arrival_gap()).collect();
        let gaps_b: Vec<f64> = (0..5).map(|_| b.next_inter_arrival_gap()).collect();
        assert_eq!(gaps_a, gaps_b);
    }

    #[test]
    fn draws_stay_in_range() {
        let mut source = SeededVariates::new(11, 3.0, 4.0, 0.25).unwrap();
        for _ in 0..1_000 {
            assert!(source.next_inter_arrival_gap() >= 0.0);
            assert!(source.next_service_duration() >= 0.0);
            assert!(source.next_rest_duration() >= 0.0);
            let trigger = source.next_rest_trigger();
            assert!((0.0..1.0).contains(&trigger));
            let draw = source.next_customer_type_draw();
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn negative_rate_is_rejected() {
        let err = SeededVariates::new(1, -1.0, 1.0, 1.0).err().unwrap();
        assert_eq!(err.to_string(), "arrival_rate must be > 0 (got -1)");
    }
}
