use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::customer::CustomerId;
use crate::error::InvariantViolation;

/// 1-based; the server at pool index `i` has id `i + 1`.
pub type ServerId = usize;

type Transition<T> = std::result::Result<T, InvariantViolation>;

/// Index into the pool's queue arena. Every human server owns one queue; all
/// self-check counters hold the handle of the one shared queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QueueHandle(usize);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaitQueue {
    customers: VecDeque<CustomerId>,
}

impl WaitQueue {
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn head(&self) -> Option<CustomerId> {
        self.customers.front().copied()
    }

    fn pushed(&self, customer: CustomerId) -> Self {
        let mut customers = self.customers.clone();
        customers.push_back(customer);
        Self { customers }
    }

    fn popped(&self) -> Self {
        let mut customers = self.customers.clone();
        customers.pop_front();
        Self { customers }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServerKind {
    Human { resting: bool },
    SelfCheck,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Server {
    pub id: ServerId,
    pub capacity: usize,
    pub idle: bool,
    pub next_available: f64,
    pub queue: QueueHandle,
    pub kind: ServerKind,
}

impl Server {
    fn new(id: ServerId, capacity: usize, queue: QueueHandle, kind: ServerKind) -> Self {
        Self {
            id,
            capacity,
            idle: true,
            next_available: 0.0,
            queue,
            kind,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, ServerKind::Human { .. })
    }

    pub fn is_resting(&self) -> bool {
        matches!(self.kind, ServerKind::Human { resting: true })
    }

    pub fn is_idle(&self, now: f64) -> bool {
        !self.is_resting() && self.idle && now >= self.next_available
    }

    /// Self-check counters only look at the shared queue's capacity.
    pub fn can_queue(&self, now: f64, queue: &WaitQueue) -> bool {
        let has_room = queue.len() < self.capacity;
        match self.kind {
            ServerKind::Human { .. } => now < self.next_available && has_room,
            ServerKind::SelfCheck => has_room,
        }
    }

    pub fn label(&self) -> ServerLabel {
        match self.kind {
            ServerKind::Human { .. } => ServerLabel::Human(self.id),
            ServerKind::SelfCheck => ServerLabel::SelfCheck(self.id),
        }
    }

    pub fn serve_upon_arrival(&self, now: f64, queue: &WaitQueue) -> Transition<Server> {
        if !self.is_idle(now) {
            return Err(InvariantViolation::ServerNotIdle(self.id));
        }
        if !queue.is_empty() {
            return Err(InvariantViolation::QueueNotEmpty(self.id));
        }
        Ok(Self {
            idle: false,
            ..self.clone()
        })
    }

    pub fn add_to_wait_queue(
        &self,
        now: f64,
        queue: &WaitQueue,
        customer: CustomerId,
    ) -> Transition<(Server, WaitQueue)> {
        if self.is_idle(now) {
            return Err(InvariantViolation::EnqueueOnIdle(self.id));
        }
        if queue.len() >= self.capacity {
            return Err(InvariantViolation::QueueFull(self.id));
        }
        Ok((self.clone(), queue.pushed(customer)))
    }

    /// Starts the service that ends at `completion_time`. A customer that was
    /// waiting leaves the head of the queue here.
    pub fn actually_serve(
        &self,
        customer: CustomerId,
        completion_time: f64,
        queue: &WaitQueue,
    ) -> (Server, WaitQueue) {
        let queue = if queue.head() == Some(customer) {
            queue.popped()
        } else {
            queue.clone()
        };
        let server = Self {
            idle: false,
            next_available: completion_time,
            ..self.clone()
        };
        (server, queue)
    }

    pub fn done_serving(&self) -> Server {
        Self {
            idle: true,
            ..self.clone()
        }
    }

    pub fn start_resting(&self, rest_until: f64) -> Transition<Server> {
        match self.kind {
            ServerKind::Human { .. } => Ok(Self {
                idle: true,
                next_available: rest_until,
                kind: ServerKind::Human { resting: true },
                ..self.clone()
            }),
            ServerKind::SelfCheck => Err(InvariantViolation::SelfCheckRest(self.id)),
        }
    }

    pub fn stop_resting(&self, now: f64) -> Server {
        if self.is_resting() && now >= self.next_available {
            Self {
                kind: ServerKind::Human { resting: false },
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum ServerLabel {
    Human(ServerId),
    SelfCheck(ServerId),
}

impl fmt::Display for ServerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerLabel::Human(id) => write!(f, "server {}", id),
            ServerLabel::SelfCheck(id) => write!(f, "self-check {}", id),
        }
    }
}

/// All servers, humans first, plus the queue arena they point into.
#[derive(Clone, Debug)]
pub struct ServerPool {
    servers: Vec<Server>,
    queues: Vec<WaitQueue>,
    humans: usize,
}

impl ServerPool {
    pub fn new(humans: usize, self_checks: usize, capacity: usize) -> Self {
        let mut servers = Vec::with_capacity(humans + self_checks);
        let mut queues = Vec::with_capacity(humans + 1);
        for idx in 0..humans {
            servers.push(Server::new(
                idx + 1,
                capacity,
                QueueHandle(idx),
                ServerKind::Human { resting: false },
            ));
            queues.push(WaitQueue::default());
        }
        if self_checks > 0 {
            let shared = QueueHandle(queues.len());
            queues.push(WaitQueue::default());
            for idx in humans..humans + self_checks {
                servers.push(Server::new(idx + 1, capacity, shared, ServerKind::SelfCheck));
            }
        }
        Self {
            servers,
            queues,
            humans,
        }
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn get(&self, id: ServerId) -> Transition<&Server> {
        id.checked_sub(1)
            .and_then(|idx| self.servers.get(idx))
            .ok_or(InvariantViolation::UnknownServer(id))
    }

    pub fn is_human(&self, id: ServerId) -> bool {
        (1..=self.humans).contains(&id)
    }

    pub fn self_checks(&self) -> &[Server] {
        &self.servers[self.humans..]
    }

    pub fn queue(&self, handle: QueueHandle) -> &WaitQueue {
        &self.queues[handle.0]
    }

    pub fn queue_of(&self, server: &Server) -> &WaitQueue {
        self.queue(server.queue)
    }

    pub fn queues(&self) -> &[WaitQueue] {
        &self.queues
    }

    pub fn can_queue(&self, server: &Server, now: f64) -> bool {
        server.can_queue(now, self.queue_of(server))
    }

    pub fn queue_len(&self, server: &Server) -> usize {
        self.queue_of(server).len()
    }

    pub fn replace(&mut self, server: Server) {
        let idx = server.id - 1;
        self.servers[idx] = server;
    }

    pub fn replace_queue(&mut self, handle: QueueHandle, queue: WaitQueue) {
        self.queues[handle.0] = queue;
    }

    /// Ends every rest whose deadline has passed.
    pub fn stop_rests(&mut self, now: f64) {
        for idx in 0..self.humans {
            self.servers[idx] = self.servers[idx].stop_resting(now);
        }
    }
}
