use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::dispatcher::Dispatcher;
use crate::scheduler::task::{Priority, Task, TaskKind, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientState {
    Idle,
    Waiting,
    Leaving,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientState::Idle => write!(f, "idle"),
            ClientState::Waiting => write!(f, "waiting"),
            ClientState::Leaving => write!(f, "leaving"),
        }
    }
}

/// Fixed per-client configuration, assigned at arrival and never changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub id: Uuid,
    /// Display label, e.g. `KQRB07`.
    pub label: String,
    pub priority: Priority,
    pub vip: bool,
    pub budget: u32,
    pub max_concurrency: usize,
}

/// A client holds handles to the tasks it created; the dispatcher's arena
/// owns the records and is the sole writer of their status.
#[derive(Debug, Clone)]
pub struct Client {
    pub config: ClientConfig,
    pub tasks: Vec<Uuid>,
    pub active_tasks: usize,
    pub state: ClientState,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
            active_tasks: 0,
            state: ClientState::Idle,
        }
    }

    /// The only creation path for a task. Returns `None` once the client's
    /// concurrency cap is reached; the caller must check.
    pub fn create_task(&mut self, kind: TaskKind, duration_ms: u64, now: u64) -> Option<Task> {
        if self.active_tasks >= self.config.max_concurrency {
            return None;
        }
        let task = Task::new(
            self.config.id,
            kind,
            duration_ms,
            self.config.vip,
            self.config.priority,
            now,
        );
        self.tasks.push(task.id);
        self.active_tasks += 1;
        self.state = ClientState::Waiting;
        Some(task)
    }
}

/// The active client roster. Retirement is the only path that removes task
/// records from the arena: a client with at least one task, all completed,
/// leaves and takes its records with it.
#[derive(Debug, Default)]
pub struct ClientRoster {
    clients: Vec<Client>,
}

impl ClientRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, client: Client) {
        tracing::debug!(
            client = %client.config.label,
            vip = client.config.vip,
            priority = %client.config.priority,
            "Client admitted"
        );
        self.clients.push(client);
    }

    pub fn get(&self, id: &Uuid) -> Option<&Client> {
        self.clients.iter().find(|c| &c.config.id == id)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Recompute each client's active-task count and state from the arena,
    /// then retire every client whose tasks have all completed. Returns the
    /// retired client ids.
    pub fn sync_and_retire(&mut self, dispatcher: &mut Dispatcher) -> Vec<Uuid> {
        for client in &mut self.clients {
            let active = client
                .tasks
                .iter()
                .filter(|id| {
                    dispatcher
                        .task(id)
                        .is_some_and(|t| t.status != TaskStatus::Completed)
                })
                .count();
            client.active_tasks = active;
            client.state = if client.tasks.is_empty() {
                ClientState::Idle
            } else if active == 0 {
                ClientState::Leaving
            } else {
                ClientState::Waiting
            };
        }

        let mut retired = Vec::new();
        self.clients.retain(|client| {
            let done = !client.tasks.is_empty() && client.active_tasks == 0;
            if done {
                dispatcher.release_tasks(&client.tasks);
                tracing::info!(
                    client = %client.config.label,
                    tasks = client.tasks.len(),
                    "Client retired"
                );
                retired.push(client.config.id);
            }
            !done
        });
        retired
    }
}
