use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pending task that has waited more than this many multiples of its
/// required time without being started gets its warning flag set.
pub const AGING_FACTOR: u64 = 3;

/// The closed set of work categories a task can belong to. Each worker
/// accepts exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Image,
    Video,
    Audio,
    Text,
}

impl TaskKind {
    /// Short code used in worker labels, e.g. `W-3 [IMG]`.
    pub fn code(&self) -> &'static str {
        match self {
            TaskKind::Image => "IMG",
            TaskKind::Video => "VID",
            TaskKind::Audio => "AUD",
            TaskKind::Text => "TXT",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Image => write!(f, "image"),
            TaskKind::Video => write!(f, "video"),
            TaskKind::Audio => write!(f, "audio"),
            TaskKind::Text => write!(f, "text"),
        }
    }
}

/// Client service tier. L2 clients get a higher concurrency cap; queue
/// priority comes from the VIP flag, not the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    L1,
    L2,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::L1 => write!(f, "L1"),
            Priority::L2 => write!(f, "L2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A unit of work. All timestamps are simulation-clock milliseconds, the
/// same clock the dispatcher accumulates from tick deltas; the core never
/// reads the wall clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub client_id: Uuid,
    pub kind: TaskKind,
    pub required_ms: u64,
    /// May go transiently negative; the completion check is `<= 0`.
    pub remaining_ms: i64,
    pub status: TaskStatus,
    pub created_at: u64,
    /// Set exactly once, when a worker accepts the task. Cleared again only
    /// by forced eviction, which returns the task to the queue.
    pub started_at: Option<u64>,
    /// Copied from the owning client at creation, immutable thereafter.
    pub vip: bool,
    pub priority: Priority,
    /// Sticky once set; aging is a liveness signal, never a cancellation.
    pub warning: bool,
}

impl Task {
    pub fn new(
        client_id: Uuid,
        kind: TaskKind,
        required_ms: u64,
        vip: bool,
        priority: Priority,
        now: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            kind,
            required_ms,
            remaining_ms: required_ms as i64,
            status: TaskStatus::Pending,
            created_at: now,
            started_at: None,
            vip,
            priority,
            warning: false,
        }
    }

    /// Fraction of required time already worked, clamped to `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.required_ms == 0 {
            return 1.0;
        }
        let worked = self.required_ms as i64 - self.remaining_ms;
        (worked as f64 / self.required_ms as f64).clamp(0.0, 1.0)
    }
}
