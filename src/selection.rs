use crate::server::{Server, ServerId, ServerPool};

/// Outcome of scanning the pool for an arriving customer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ServerQuery {
    pub idle: Option<ServerId>,
    pub queueable: Option<ServerId>,
    pub shortest_queueable: Option<ServerId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Placement {
    Serve(ServerId),
    Queue(ServerId),
    Leave,
}

impl ServerQuery {
    pub fn resolve(&self, greedy: bool) -> Placement {
        if let Some(id) = self.idle {
            return Placement::Serve(id);
        }
        let queue_at = if greedy {
            self.shortest_queueable
        } else {
            self.queueable
        };
        match queue_at {
            Some(id) => Placement::Queue(id),
            None => Placement::Leave,
        }
    }
}

/// First idle server in pool order wins. Only when there is none are the
/// queueable servers considered; ties on queue length keep the earlier one.
pub fn query_servers(pool: &ServerPool, now: f64) -> ServerQuery {
    if let Some(server) = pool.servers().iter().find(|server| server.is_idle(now)) {
        return ServerQuery {
            idle: Some(server.id),
            ..ServerQuery::default()
        };
    }

    let mut query = ServerQuery::default();
    let mut shortest_len = usize::MAX;
    for server in pool.servers() {
        if !pool.can_queue(server, now) {
            continue;
        }
        if query.queueable.is_none() {
            query.queueable = Some(server.id);
        }
        let len = pool.queue_len(server);
        if len < shortest_len {
            shortest_len = len;
            query.shortest_queueable = Some(server.id);
        }
    }
    query
}

/// The self-check counter a waiting customer should look at now: the first
/// idle one, otherwise the one that frees up soonest.
pub fn best_self_check(pool: &ServerPool, now: f64) -> Option<ServerId> {
    let counters = pool.self_checks();
    if let Some(server) = counters.iter().find(|server| server.is_idle(now)) {
        return Some(server.id);
    }

    let mut best: Option<&Server> = None;
    for server in counters {
        let better = match best {
            Some(current) => server.next_available - now < current.next_available - now,
            None => true,
        };
        if better {
            best = Some(server);
        }
    }
    best.map(|server| server.id)
}
