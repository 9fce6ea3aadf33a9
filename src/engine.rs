use log::{debug, info, trace};

use crate::customer::{Customer, CustomerStatus};
use crate::error::{Error, InvariantViolation, Result};
use crate::events::EventClock;
use crate::models::SimConfig;
use crate::selection::{best_self_check, query_servers, Placement};
use crate::server::ServerPool;
use crate::state::{LogEntry, RunMetadata, SimulationResult, Stats};
use crate::variates::{SeededVariates, VariateSource};

pub struct SimulationEngine {
    pub config: SimConfig,
    pub clock: EventClock,
    pub pool: ServerPool,
    pub stats: Stats,
    pub entries: Vec<LogEntry>,
    pub variates: Box<dyn VariateSource>,
    store_entries: bool,
    last_time: f64,
}

impl SimulationEngine {
    /// Validates `config` and schedules every arrival up front.
    pub fn new(config: SimConfig, mut variates: Box<dyn VariateSource>) -> Result<Self> {
        validate_config(&config)?;

        let mut stats = Stats::default();
        let mut clock = EventClock::with_capacity(config.arrivals);
        let mut time = 0.0;
        for id in 1..=config.arrivals {
            let greedy = variates.next_customer_type_draw() < config.greedy_probability;
            clock.push(Customer::arrive(id, time, greedy, &mut stats));
            time += variates.next_inter_arrival_gap();
        }

        let pool = ServerPool::new(config.servers, config.self_checks, config.queue_capacity);
        Ok(Self {
            config,
            clock,
            pool,
            stats,
            entries: Vec::new(),
            variates,
            store_entries: true,
            last_time: 0.0,
        })
    }

    pub fn seeded(config: SimConfig) -> Result<Self> {
        let variates = SeededVariates::from_config(&config)?;
        Self::new(config, Box::new(variates))
    }

    pub fn store_entries(mut self, store: bool) -> Self {
        self.store_entries = store;
        self
    }

    pub fn run(&mut self) -> Result<SimulationResult> {
        info!(
            "running {} arrivals across {} servers and {} self-checks (qmax {})",
            self.config.arrivals, self.config.servers, self.config.self_checks, self.config.queue_capacity
        );
        if self.store_entries {
            self.entries.reserve(self.config.arrivals * 4);
        }

        while self.step()?.is_some() {}

        let summary = self.stats.summary();
        info!(
            "run finished at {:.3}: served {}, left {}, average wait {:.3}",
            self.last_time, summary.served, summary.left, summary.average_wait
        );
        Ok(SimulationResult {
            entries: std::mem::take(&mut self.entries),
            summary,
            metadata: RunMetadata {
                seed: self.config.seed,
                servers: self.config.servers,
                self_checks: self.config.self_checks,
                queue_capacity: self.config.queue_capacity,
                arrivals: self.config.arrivals,
                end_time: self.last_time,
            },
        })
    }

    /// Pops the earliest customer and applies its next transition. Returns the
    /// popped value, or `None` once the clock is empty.
    pub fn step(&mut self) -> Result<Option<Customer>> {
        let customer = match self.clock.pop() {
            Some(customer) => customer,
            None => return Ok(None),
        };
        let now = customer.present_time;
        let fail = |violation| Error::Invariant {
            violation,
            customer: customer.id,
            time: now,
        };

        if now < self.last_time {
            return Err(fail(InvariantViolation::TimeReversed {
                from: self.last_time,
                to: now,
            }));
        }
        self.last_time = now;
        self.pool.stop_rests(now);

        if customer.first_wait {
            self.record(&customer).map_err(fail)?;
        }

        let outcome = match customer.status {
            CustomerStatus::Arrived => self.handle_arrival(&customer, now).map(Some),
            CustomerStatus::Waiting => self.handle_waiting(&customer, now).map(Some),
            CustomerStatus::Served => self.handle_served(&customer, now).map(Some),
            CustomerStatus::Done => self.handle_done(&customer, now).map(|_| None),
            CustomerStatus::Left => Ok(None),
        };
        if let Some(next) = outcome.map_err(fail)? {
            debug!(
                "{:.3} customer {} {} -> {} (next {:.3})",
                now,
                customer.id,
                customer.status.keyword(),
                next.status.keyword(),
                next.present_time
            );
            self.clock.push(next);
        }

        Ok(Some(customer))
    }

    pub fn pool(&self) -> &ServerPool {
        &self.pool
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    fn record(&mut self, customer: &Customer) -> std::result::Result<(), InvariantViolation> {
        if !self.store_entries {
            return Ok(());
        }
        let label = match customer.server {
            Some(id) => Some(self.pool.get(id)?.label()),
            None => None,
        };
        self.entries.push(LogEntry::new(customer, label));
        Ok(())
    }

    fn handle_arrival(
        &mut self,
        customer: &Customer,
        now: f64,
    ) -> std::result::Result<Customer, InvariantViolation> {
        let query = query_servers(&self.pool, now);
        trace!("{:.3} customer {} query {:?}", now, customer.id, query);

        match query.resolve(customer.greedy) {
            Placement::Serve(id) => {
                let server = self.pool.get(id)?;
                let updated = server.serve_upon_arrival(now, self.pool.queue_of(server))?;
                self.pool.replace(updated);
                customer.served_on_arrival(id)
            }
            Placement::Queue(id) => {
                let server = self.pool.get(id)?;
                let (updated, queue) =
                    server.add_to_wait_queue(now, self.pool.queue_of(server), customer.id)?;
                // The shared line waits on whichever counter frees up first.
                let (assigned, available_at) = if updated.is_human() {
                    (id, updated.next_available)
                } else {
                    let best =
                        best_self_check(&self.pool, now).ok_or(InvariantViolation::NoSelfCheck)?;
                    (best, self.pool.get(best)?.next_available)
                };
                let waiting = customer.waits_on_arrival(assigned, available_at, &mut self.stats)?;
                self.pool.replace_queue(updated.queue, queue);
                self.pool.replace(updated);
                Ok(waiting)
            }
            Placement::Leave => customer.leaves(&mut self.stats),
        }
    }

    /// Self-check customers are re-pointed at the best counter before the
    /// check; human-server customers stay with their server.
    fn handle_waiting(
        &mut self,
        customer: &Customer,
        now: f64,
    ) -> std::result::Result<Customer, InvariantViolation> {
        let assigned = customer.server.ok_or(InvariantViolation::Unassigned)?;
        let id = if self.pool.is_human(assigned) {
            assigned
        } else {
            best_self_check(&self.pool, now).ok_or(InvariantViolation::NoSelfCheck)?
        };

        let server = self.pool.get(id)?;
        let at_head = self.pool.queue_of(server).head() == Some(customer.id);
        if server.is_resting() || !server.is_idle(now) || !at_head {
            customer.keeps_waiting(id, server.next_available)
        } else {
            let available_at = server.next_available;
            customer.served_after_wait(id, available_at, &mut self.stats)
        }
    }

    fn handle_served(
        &mut self,
        customer: &Customer,
        now: f64,
    ) -> std::result::Result<Customer, InvariantViolation> {
        let id = customer.server.ok_or(InvariantViolation::Unassigned)?;
        let completion = now + self.variates.next_service_duration();
        let done = customer.done(completion, &mut self.stats)?;

        let server = self.pool.get(id)?;
        let (updated, queue) =
            server.actually_serve(customer.id, completion, self.pool.queue_of(server));
        self.pool.replace_queue(updated.queue, queue);
        self.pool.replace(updated);
        Ok(done)
    }

    /// Frees the server; a human server then may start a rest.
    fn handle_done(
        &mut self,
        customer: &Customer,
        now: f64,
    ) -> std::result::Result<(), InvariantViolation> {
        let id = customer.server.ok_or(InvariantViolation::Unassigned)?;
        let server = self.pool.get(id)?.done_serving();
        let server = if server.is_human()
            && self.variates.next_rest_trigger() < self.config.rest_probability
        {
            let rest_until = now + self.variates.next_rest_duration();
            debug!("{:.3} server {} rests until {:.3}", now, id, rest_until);
            server.start_resting(rest_until)?
        } else {
            server
        };
        self.pool.replace(server);
        Ok(())
    }
}

pub fn run_simulation(config: &SimConfig) -> Result<SimulationResult> {
    run_simulation_with_options(config, true)
}

pub fn run_simulation_summary(config: &SimConfig) -> Result<SimulationResult> {
    run_simulation_with_options(config, false)
}

pub fn run_simulation_with_options(
    config: &SimConfig,
    store_entries: bool,
) -> Result<SimulationResult> {
    let mut engine = SimulationEngine::seeded(config.clone())?.store_entries(store_entries);
    engine.run()
}

pub fn validate_config(config: &SimConfig) -> Result<()> {
    if config.total_servers() == 0 {
        return Err(Error::NoServers);
    }
    if config.arrivals == 0 {
        return Err(Error::ArrivalsZero);
    }
    for (name, value) in [
        ("arrival_rate", config.arrival_rate),
        ("service_rate", config.service_rate),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(Error::InvalidRate { name, value });
        }
    }
    if !config.rest_rate.is_finite() || config.rest_rate < 0.0 {
        return Err(Error::InvalidRate {
            name: "rest_rate",
            value: config.rest_rate,
        });
    }
    for (name, value) in [
        ("rest_probability", config.rest_probability),
        ("greedy_probability", config.greedy_probability),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidProbability { name, value });
        }
    }
    if config.rest_probability > 0.0 && config.rest_rate == 0.0 {
        return Err(Error::RestRateZero);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variates::FixedVariates;

    fn config(servers: usize, self_checks: usize, queue_capacity: usize, arrivals: usize) -> SimConfig {
        SimConfig {
            seed: 1,
            servers,
            self_checks,
            queue_capacity,
            arrivals,
            arrival_rate: 1.0,
            service_rate: 1.0,
            rest_rate: 1.0,
            rest_probability: 0.0,
            greedy_probability: 0.0,
        }
    }

    fn run_fixed(config: SimConfig, variates: FixedVariates) -> SimulationResult {
        let mut engine =
            SimulationEngine::new(config, Box::new(variates)).expect("config should be valid");
        engine.run().expect("simulation should succeed")
    }

    fn lines(result: &SimulationResult) -> Vec<String> {
        result.entries.iter().map(|entry| entry.to_string()).collect()
    }

    #[test]
    fn single_server_queue_replays_by_hand() {
        let result = run_fixed(config(1, 0, 1, 3), FixedVariates::new(1.0, 1.5));
        assert_eq!(
            lines(&result),
            vec![
                "0.000 1 arrives",
                "0.000 1 served by server 1",
                "1.000 2 arrives",
                "1.000 2 waits to be served by server 1",
                "1.500 1 done serving by server 1",
                "1.500 2 served by server 1",
                "2.000 3 arrives",
                "2.000 3 waits to be served by server 1",
                "3.000 2 done serving by server 1",
                "3.000 3 served by server 1",
                "4.500 3 done serving by server 1",
            ]
        );
        assert_eq!(result.summary.to_string(), "[0.500 3 0]");
        assert_eq!(result.summary.waited, 2);
        assert_eq!(result.metadata.end_time, 4.5);
    }

    #[test]
    fn zero_capacity_turns_busy_arrivals_away() {
        let result = run_fixed(config(1, 0, 0, 3), FixedVariates::new(1.0, 1.5));
        assert_eq!(
            lines(&result),
            vec![
                "0.000 1 arrives",
                "0.000 1 served by server 1",
                "1.000 2 arrives",
                "1.000 2 leaves",
                "1.500 1 done serving by server 1",
                "2.000 3 arrives",
                "2.000 3 served by server 1",
                "3.500 3 done serving by server 1",
            ]
        );
        assert_eq!(result.summary.to_string(), "[0.000 2 1]");
    }

    #[test]
    fn shared_queue_fills_then_customers_leave() {
        let result = run_fixed(config(0, 2, 2, 5), FixedVariates::new(0.001, 10.0));
        let lines = lines(&result);
        assert!(lines.contains(&"0.002 3 waits to be served by self-check 1".to_string()));
        assert!(lines.contains(&"0.003 4 waits to be served by self-check 1".to_string()));
        assert!(lines.contains(&"0.004 5 leaves".to_string()));
        assert!(lines.contains(&"10.000 3 served by self-check 1".to_string()));
        assert!(lines.contains(&"10.001 4 served by self-check 2".to_string()));
        assert_eq!(result.summary.served, 4);
        assert_eq!(result.summary.left, 1);
    }

    #[test]
    fn resting_server_delays_waiting_customers() {
        let mut cfg = config(1, 0, 2, 3);
        cfg.rest_probability = 1.0;
        let variates = FixedVariates {
            rest_trigger: 0.0,
            rest_duration: 1.0,
            ..FixedVariates::new(1.0, 1.5)
        };
        let result = run_fixed(cfg, variates);
        let lines = lines(&result);
        assert!(lines.contains(&"2.500 2 served by server 1".to_string()));
        assert!(lines.contains(&"5.000 3 served by server 1".to_string()));
        assert_eq!(result.summary.to_string(), "[1.500 3 0]");
    }

    #[test]
    fn greedy_customer_picks_shortest_queue() {
        let mut cfg = config(2, 0, 2, 4);
        cfg.greedy_probability = 1.0;
        let variates = FixedVariates {
            customer_type_draw: 0.0,
            ..FixedVariates::new(1.0, 10.0)
        };
        let greedy = lines(&run_fixed(cfg.clone(), variates.clone()));
        assert!(greedy.contains(&"2.000 3 waits to be served by server 1".to_string()));
        assert!(greedy.contains(&"3.000 4 waits to be served by server 2".to_string()));

        cfg.greedy_probability = 0.0;
        let polite = lines(&run_fixed(cfg, variates));
        assert!(polite.contains(&"3.000 4 waits to be served by server 1".to_string()));
    }

    #[test]
    fn step_exposes_pool_between_events() {
        let engine = SimulationEngine::new(config(1, 0, 1, 4), Box::new(FixedVariates::new(0.5, 2.0)));
        let mut engine = engine.expect("config should be valid");
        let mut last = 0.0;
        while let Some(customer) = engine.step().expect("step should succeed") {
            assert!(customer.present_time >= last);
            last = customer.present_time;
            assert!(engine.pool().queues().iter().all(|queue| queue.len() <= 1));
            let stats = engine.stats();
            assert!(stats.served + stats.left <= stats.entered);
        }
        let stats = engine.stats();
        assert_eq!(stats.served + stats.left, stats.entered);
    }

    #[test]
    fn seeded_runs_are_deterministic() {
        let mut cfg = config(2, 2, 2, 50);
        cfg.rest_probability = 0.3;
        cfg.greedy_probability = 0.4;
        cfg.seed = 42;
        let a = run_simulation(&cfg).expect("simulation should succeed");
        let b = run_simulation(&cfg).expect("simulation should succeed");
        assert_eq!(a, b);
    }

    #[test]
    fn summary_mode_keeps_statistics() {
        let mut cfg = config(1, 1, 1, 30);
        cfg.seed = 9;
        let full = run_simulation(&cfg).expect("simulation should succeed");
        let summary = run_simulation_summary(&cfg).expect("simulation should succeed");
        assert!(summary.entries.is_empty());
        assert_eq!(full.summary, summary.summary);
    }

    #[test]
    fn backwards_clock_aborts_with_customer_and_time() {
        let mut engine = SimulationEngine::new(config(1, 0, 1, 2), Box::new(FixedVariates::new(1.0, -0.5)))
            .expect("config should be valid");
        let err = engine.run().unwrap_err();
        assert!(matches!(
            err,
            Error::Invariant {
                violation: InvariantViolation::TimeReversed { .. },
                customer: 1,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "invariant violated for customer 1 at time -0.500: clock went backwards from 0.000 to -0.500"
        );
    }

    #[test]
    fn invalid_configs_error() {
        assert!(matches!(validate_config(&config(0, 0, 1, 1)), Err(Error::NoServers)));
        assert!(matches!(validate_config(&config(1, 0, 1, 0)), Err(Error::ArrivalsZero)));

        let mut cfg = config(1, 0, 1, 1);
        cfg.service_rate = 0.0;
        assert_eq!(
            validate_config(&cfg).unwrap_err().to_string(),
            "service_rate must be > 0 (got 0)"
        );

        let mut cfg = config(1, 0, 1, 1);
        cfg.greedy_probability = 1.5;
        assert_eq!(
            validate_config(&cfg).unwrap_err().to_string(),
            "greedy_probability must be within [0, 1] (got 1.5)"
        );

        let mut cfg = config(1, 0, 1, 1);
        cfg.rest_probability = 0.5;
        cfg.rest_rate = 0.0;
        assert!(matches!(validate_config(&cfg), Err(Error::RestRateZero)));
    }
}
