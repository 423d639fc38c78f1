use uuid::Uuid;

use crate::scheduler::task::TaskKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Idle,
    Working,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerStatus::Idle => write!(f, "idle"),
            WorkerStatus::Working => write!(f, "working"),
        }
    }
}

/// A worker slot with a fixed type affinity. Holds at most one task at a
/// time, exclusively, while working.
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: u64,
    pub affinity: TaskKind,
    pub status: WorkerStatus,
    pub current: Option<Uuid>,
}

impl Worker {
    fn new(id: u64, affinity: TaskKind) -> Self {
        Self {
            id,
            affinity,
            status: WorkerStatus::Idle,
            current: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == WorkerStatus::Idle
    }

    pub fn label(&self) -> String {
        format!("W-{} [{}]", self.id, self.affinity.code())
    }
}

/// Elastic worker registry. Ids are fresh and never reused; affinity is
/// fixed at creation. There is no capacity ceiling.
#[derive(Debug, Default)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    next_id: u64,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: TaskKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.workers.push(Worker::new(id, kind));
        tracing::info!(worker_id = id, kind = %kind, "Worker added");
        id
    }

    /// Remove a worker of the given kind, preferring an idle one; if all are
    /// busy, evict one mid-task. `None` when no worker of that kind exists.
    /// The caller is responsible for requeueing any task the removed worker
    /// still held.
    pub fn remove(&mut self, kind: TaskKind) -> Option<Worker> {
        let idx = self
            .workers
            .iter()
            .position(|w| w.affinity == kind && w.is_idle())
            .or_else(|| self.workers.iter().position(|w| w.affinity == kind))?;
        Some(self.workers.remove(idx))
    }

    /// Ids of currently idle workers, in pool order.
    pub fn idle_ids(&self) -> Vec<u64> {
        self.workers
            .iter()
            .filter(|w| w.is_idle())
            .map(|w| w.id)
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| w.id == id)
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn workers_mut(&mut self) -> impl Iterator<Item = &mut Worker> {
        self.workers.iter_mut()
    }

    pub fn count(&self, kind: TaskKind) -> usize {
        self.workers.iter().filter(|w| w.affinity == kind).count()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
