use std::collections::BTreeMap;

use serde::Serialize;

use crate::client::ClientRoster;
use crate::config::SimConfig;
use crate::scheduler::dispatcher::Dispatcher;
use crate::spawner::Spawner;

/// Running counters of everything the loop has done so far.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SimStats {
    pub ticks: u64,
    pub clients_spawned: u64,
    pub clients_retired: u64,
    pub tasks_submitted: u64,
    pub tasks_rejected: u64,
}

/// Point-in-time report, shaped for CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct SimSummary {
    pub ticks: u64,
    pub now_ms: u64,
    pub clients_active: usize,
    pub clients_spawned: u64,
    pub clients_retired: u64,
    pub tasks_submitted: u64,
    pub tasks_rejected: u64,
    pub queue_depth: usize,
    pub warnings: usize,
    pub workers: usize,
    pub completed: BTreeMap<String, u64>,
}

/// Wires the arrival generator, the client roster and the dispatcher into
/// one tick-driven loop: spawn, submit, tick, retire. Everything runs
/// synchronously inside `step`; there is no interleaving mid-tick.
pub struct Simulation {
    dispatcher: Dispatcher,
    roster: ClientRoster,
    spawner: Spawner,
    stats: SimStats,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Self {
        let mut dispatcher = Dispatcher::new();
        for (kind, count) in config.workers() {
            for _ in 0..count {
                dispatcher.add_worker(kind);
            }
        }
        Self {
            dispatcher,
            roster: ClientRoster::new(),
            spawner: Spawner::new(
                config.spawn_interval_ms,
                config.max_tasks_per_client,
                config.seed,
            ),
            stats: SimStats::default(),
        }
    }

    /// Advance the whole simulation by one tick of `delta_ms`.
    pub fn step(&mut self, delta_ms: u64) {
        if let Some(mut client) = self.spawner.update(delta_ms) {
            let now = self.dispatcher.now_ms();
            let batch = self.spawner.task_batch_size();
            for _ in 0..batch {
                let (kind, duration_ms) = self.spawner.random_order();
                // Cap reached: the client keeps what it already opened.
                let Some(task) = client.create_task(kind, duration_ms, now) else {
                    break;
                };
                match self.dispatcher.submit(task) {
                    Ok(_) => self.stats.tasks_submitted += 1,
                    Err(e) => {
                        self.stats.tasks_rejected += 1;
                        tracing::warn!(error = %e, "Task rejected at submission");
                    }
                }
            }
            tracing::info!(
                client = %client.config.label,
                vip = client.config.vip,
                priority = %client.config.priority,
                tasks = client.tasks.len(),
                "Client arrived"
            );
            self.roster.admit(client);
            self.stats.clients_spawned += 1;
        }

        self.dispatcher.tick(delta_ms);

        let retired = self.roster.sync_and_retire(&mut self.dispatcher);
        self.stats.clients_retired += retired.len() as u64;
        self.stats.ticks += 1;
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn roster(&self) -> &ClientRoster {
        &self.roster
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn summary(&self) -> SimSummary {
        let completed = self
            .dispatcher
            .completions()
            .iter()
            .map(|(kind, count)| (kind.to_string(), *count))
            .collect();
        SimSummary {
            ticks: self.stats.ticks,
            now_ms: self.dispatcher.now_ms(),
            clients_active: self.roster.len(),
            clients_spawned: self.stats.clients_spawned,
            clients_retired: self.stats.clients_retired,
            tasks_submitted: self.stats.tasks_submitted,
            tasks_rejected: self.stats.tasks_rejected,
            queue_depth: self.dispatcher.queue_len(),
            warnings: self.dispatcher.tasks().filter(|t| t.warning).count(),
            workers: self.dispatcher.workers().len(),
            completed,
        }
    }
}
