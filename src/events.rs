use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::customer::Customer;

/// A customer value keyed for the clock: earliest `present_time` first,
/// lower id on ties.
#[derive(Clone, Debug)]
pub struct ScheduledCustomer(pub Customer);

impl ScheduledCustomer {
    pub fn time(&self) -> f64 {
        self.0.present_time
    }
}

impl Ord for ScheduledCustomer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time()
            .total_cmp(&other.time())
            .then_with(|| self.0.id.cmp(&other.0.id))
    }
}

impl PartialOrd for ScheduledCustomer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledCustomer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledCustomer {}

/// Min-queue of live customers; the only source of simulated time.
#[derive(Debug, Default)]
pub struct EventClock {
    heap: BinaryHeap<Reverse<ScheduledCustomer>>,
}

impl EventClock {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, customer: Customer) {
        self.heap.push(Reverse(ScheduledCustomer(customer)));
    }

    pub fn pop(&mut self) -> Option<Customer> {
        self.heap.pop().map(|Reverse(scheduled)| scheduled.0)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(scheduled)| scheduled.time())
    }
}
