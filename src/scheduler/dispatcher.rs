use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

use crate::error::{Result, RiverError};
use crate::scheduler::pool::{Worker, WorkerPool, WorkerStatus};
use crate::scheduler::table::TaskTable;
use crate::scheduler::task::{Task, TaskKind, TaskStatus, AGING_FACTOR};

/// The scheduler core: owns the task arena, the priority-ordered pending
/// queue and the worker pool, and advances all of it one tick at a time.
///
/// The queue holds two classes: every VIP task precedes every non-VIP task,
/// and arrival order is preserved within each class. Assignment iterates
/// idle workers and scans the queue for the first kind-compatible task, so
/// priority order is only guaranteed within a single worker's compatible
/// subsequence of the queue — best-effort priority, not a hard SLA.
#[derive(Debug)]
pub struct Dispatcher {
    tasks: TaskTable,
    pending: VecDeque<Uuid>,
    pool: WorkerPool,
    now_ms: u64,
    completed: HashMap<TaskKind, u64>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            tasks: TaskTable::new(),
            pending: VecDeque::new(),
            pool: WorkerPool::new(),
            now_ms: 0,
            completed: HashMap::new(),
        }
    }

    /// Accept a freshly created task into the pending queue.
    ///
    /// VIP tasks are placed immediately after the last VIP already queued
    /// (at the head if there is none); non-VIP tasks append to the tail.
    /// Only pending, never-started tasks are accepted.
    pub fn submit(&mut self, task: Task) -> Result<Uuid> {
        if task.status != TaskStatus::Pending || task.started_at.is_some() {
            return Err(RiverError::NotSubmittable(task.id));
        }

        let vip = task.vip;
        let id = self.tasks.insert(task);
        if vip {
            let at = self
                .pending
                .iter()
                .rposition(|qid| self.tasks.get(qid).is_some_and(|t| t.vip))
                .map_or(0, |i| i + 1);
            self.pending.insert(at, id);
        } else {
            self.pending.push_back(id);
        }
        tracing::debug!(task_id = %id, vip, queue_len = self.pending.len(), "Task queued");
        Ok(id)
    }

    /// Advance the whole system by `delta_ms` of simulated time.
    ///
    /// Four phases run in fixed order; later phases observe state mutated by
    /// earlier ones:
    /// 1. aging check on still-queued tasks,
    /// 2. assignment of queued tasks to compatible idle workers,
    /// 3. progress on all in-flight tasks,
    /// 4. completion of tasks whose remaining time reached zero.
    ///
    /// A zero delta is a valid no-progress tick.
    pub fn tick(&mut self, delta_ms: u64) {
        self.now_ms += delta_ms;
        self.check_aging();
        self.assign();
        self.progress(delta_ms);
        self.complete();
    }

    /// Flag tasks that have waited more than `AGING_FACTOR` times their
    /// required time without being started. Idempotent, never cleared, never
    /// drops the task.
    fn check_aging(&mut self) {
        for id in &self.pending {
            let Some(task) = self.tasks.get_mut(id) else {
                continue;
            };
            // A task may arrive stamped ahead of this dispatcher's clock;
            // it has simply waited zero time so far.
            let waited = self.now_ms.saturating_sub(task.created_at);
            if task.started_at.is_none()
                && !task.warning
                && waited > task.required_ms.saturating_mul(AGING_FACTOR)
            {
                task.warning = true;
                tracing::warn!(
                    task_id = %task.id,
                    kind = %task.kind,
                    waited_ms = waited,
                    "Task aging past threshold"
                );
            }
        }
    }

    /// Snapshot the idle workers, then give each one the first queued task
    /// matching its affinity. A kind with no affine worker simply stays
    /// queued; starvation is an accepted non-error here.
    fn assign(&mut self) {
        for worker_id in self.pool.idle_ids() {
            let Some(affinity) = self.pool.get(worker_id).map(|w| w.affinity) else {
                continue;
            };
            let Some(pos) = self
                .pending
                .iter()
                .position(|id| self.tasks.get(id).is_some_and(|t| t.kind == affinity))
            else {
                continue;
            };
            let Some(task_id) = self.pending.remove(pos) else {
                continue;
            };

            if let Some(task) = self.tasks.get_mut(&task_id) {
                task.status = TaskStatus::Processing;
                task.started_at = Some(self.now_ms);
            }
            if let Some(worker) = self.pool.get_mut(worker_id) {
                worker.status = WorkerStatus::Working;
                worker.current = Some(task_id);
            }
            tracing::debug!(task_id = %task_id, worker_id, "Task assigned");
        }
    }

    fn progress(&mut self, delta_ms: u64) {
        for worker in self.pool.workers_mut() {
            if worker.status != WorkerStatus::Working {
                continue;
            }
            let Some(task_id) = worker.current else {
                continue;
            };
            if let Some(task) = self.tasks.get_mut(&task_id) {
                task.remaining_ms -= delta_ms as i64;
            }
        }
    }

    fn complete(&mut self) {
        for worker in self.pool.workers_mut() {
            if worker.status != WorkerStatus::Working {
                continue;
            }
            let Some(task_id) = worker.current else {
                continue;
            };
            let Some(task) = self.tasks.get_mut(&task_id) else {
                continue;
            };
            if task.remaining_ms <= 0 {
                task.status = TaskStatus::Completed;
                *self.completed.entry(task.kind).or_default() += 1;
                worker.current = None;
                worker.status = WorkerStatus::Idle;
                tracing::info!(
                    task_id = %task_id,
                    worker_id = worker.id,
                    kind = %task.kind,
                    "Task completed"
                );
            }
        }
    }

    // ---- pool resize --------------------------------------------------

    pub fn add_worker(&mut self, kind: TaskKind) -> u64 {
        self.pool.add(kind)
    }

    /// Shrink the pool by one worker of the given kind; a silent no-op when
    /// none exists. A force-evicted task goes back to `Pending` with its
    /// start cleared but its remaining time intact, reinserted at the queue
    /// front ahead of everything, VIPs included.
    pub fn remove_worker(&mut self, kind: TaskKind) -> Option<u64> {
        let worker = self.pool.remove(kind)?;
        if let Some(task_id) = worker.current {
            if let Some(task) = self.tasks.get_mut(&task_id) {
                task.status = TaskStatus::Pending;
                task.started_at = None;
                tracing::info!(
                    task_id = %task_id,
                    worker_id = worker.id,
                    remaining_ms = task.remaining_ms,
                    "Worker evicted mid-task, task requeued at front"
                );
            }
            self.pending.push_front(task_id);
        } else {
            tracing::info!(worker_id = worker.id, kind = %kind, "Idle worker removed");
        }
        Some(worker.id)
    }

    // ---- queries ------------------------------------------------------

    /// Simulation clock, milliseconds accumulated from tick deltas.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn task(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// The pending queue in assignment priority order.
    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.pending
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    pub fn queue_len(&self) -> usize {
        self.pending.len()
    }

    pub fn workers(&self) -> &[Worker] {
        self.pool.workers()
    }

    pub fn worker_count(&self, kind: TaskKind) -> usize {
        self.pool.count(kind)
    }

    /// Progress fraction of the task the worker currently holds, if any.
    pub fn worker_progress(&self, worker: &Worker) -> Option<f64> {
        worker
            .current
            .and_then(|id| self.tasks.get(&id))
            .map(Task::progress)
    }

    pub fn completed(&self, kind: TaskKind) -> u64 {
        self.completed.get(&kind).copied().unwrap_or(0)
    }

    pub fn completed_total(&self) -> u64 {
        self.completed.values().sum()
    }

    pub fn completions(&self) -> &HashMap<TaskKind, u64> {
        &self.completed
    }

    /// Drop the (completed) task records of a retiring client from the
    /// arena. The dispatcher never deletes individual tasks on its own.
    pub fn release_tasks(&mut self, ids: &[Uuid]) -> usize {
        self.tasks.release_completed(ids)
    }
}
