use serde::Serialize;

use crate::error::InvariantViolation;
use crate::server::ServerId;
use crate::state::Stats;

pub type CustomerId = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomerStatus {
    Arrived,
    Waiting,
    Served,
    Done,
    Left,
}

impl CustomerStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CustomerStatus::Done | CustomerStatus::Left)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CustomerStatus::Arrived => "arrives",
            CustomerStatus::Waiting => "waits",
            CustomerStatus::Served => "served",
            CustomerStatus::Done => "done",
            CustomerStatus::Left => "leaves",
        }
    }
}

/// One arrival. Every transition consumes nothing and returns a fresh value;
/// the engine swaps the new value into the clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub entry_time: f64,
    pub present_time: f64,
    /// When the customer expects to move on. Informational; the clock keys on
    /// `present_time`.
    pub next_time: f64,
    pub status: CustomerStatus,
    pub server: Option<ServerId>,
    pub greedy: bool,
    /// Set on values that have not been written to the log yet.
    pub first_wait: bool,
}

type Transition = std::result::Result<Customer, InvariantViolation>;

impl Customer {
    pub fn arrive(id: CustomerId, time: f64, greedy: bool, stats: &mut Stats) -> Self {
        stats.entered += 1;
        Self {
            id,
            entry_time: time,
            present_time: time,
            next_time: time,
            status: CustomerStatus::Arrived,
            server: None,
            greedy,
            first_wait: true,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn expect(&self, status: CustomerStatus, transition: &'static str) -> Result<(), InvariantViolation> {
        if self.status == status {
            Ok(())
        } else {
            Err(InvariantViolation::IllegalTransition {
                from: self.status.keyword(),
                transition,
            })
        }
    }

    fn with(&self, status: CustomerStatus, present: f64, next: f64, server: Option<ServerId>) -> Self {
        Self {
            status,
            present_time: present,
            next_time: next,
            server,
            first_wait: true,
            ..self.clone()
        }
    }

    pub fn served_on_arrival(&self, server: ServerId) -> Transition {
        self.expect(CustomerStatus::Arrived, "arrives -> served")?;
        Ok(self.with(
            CustomerStatus::Served,
            self.present_time,
            self.present_time,
            Some(server),
        ))
    }

    pub fn waits_on_arrival(&self, server: ServerId, available_at: f64, stats: &mut Stats) -> Transition {
        self.expect(CustomerStatus::Arrived, "arrives -> waits")?;
        stats.waited += 1;
        Ok(self.with(
            CustomerStatus::Waiting,
            self.present_time,
            available_at,
            Some(server),
        ))
    }

    pub fn leaves(&self, stats: &mut Stats) -> Transition {
        self.expect(CustomerStatus::Arrived, "arrives -> leaves")?;
        stats.left += 1;
        Ok(self.with(
            CustomerStatus::Left,
            self.present_time,
            self.present_time,
            None,
        ))
    }

    /// Still blocked. The value is rescheduled at `available_at` and is not
    /// logged again.
    pub fn keeps_waiting(&self, server: ServerId, available_at: f64) -> Transition {
        self.expect(CustomerStatus::Waiting, "waits -> waits")?;
        let at = available_at.max(self.present_time);
        Ok(Self {
            first_wait: false,
            ..self.with(CustomerStatus::Waiting, at, at, Some(server))
        })
    }

    pub fn served_after_wait(&self, server: ServerId, available_at: f64, stats: &mut Stats) -> Transition {
        self.expect(CustomerStatus::Waiting, "waits -> served")?;
        let at = available_at.max(self.present_time);
        stats.total_wait += at - self.entry_time;
        Ok(self.with(CustomerStatus::Served, at, at, Some(server)))
    }

    pub fn done(&self, completion_time: f64, stats: &mut Stats) -> Transition {
        self.expect(CustomerStatus::Served, "served -> done")?;
        stats.served += 1;
        Ok(self.with(
            CustomerStatus::Done,
            completion_time,
            completion_time,
            self.server,
        ))
    }
}
