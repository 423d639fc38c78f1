use crate::error::{Result, RiverError};
use crate::scheduler::task::TaskKind;

/// Simulation parameters: the pool shape, the arrival process and the tick
/// length. The core takes these as plain values; nothing here is re-read at
/// runtime.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Milliseconds of simulated time per tick.
    pub tick_ms: u64,
    /// Milliseconds between client arrivals.
    pub spawn_interval_ms: u64,
    /// Upper bound on the tasks a fresh client tries to open.
    pub max_tasks_per_client: usize,
    /// Seed for the arrival generator; same seed, same run.
    pub seed: u64,
    pub image_workers: usize,
    pub video_workers: usize,
    pub audio_workers: usize,
    pub text_workers: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            spawn_interval_ms: 2_000,
            max_tasks_per_client: 5,
            seed: 42,
            image_workers: 10,
            video_workers: 10,
            audio_workers: 0,
            text_workers: 0,
        }
    }
}

impl SimConfig {
    pub fn with_workers(mut self, kind: TaskKind, count: usize) -> Self {
        match kind {
            TaskKind::Image => self.image_workers = count,
            TaskKind::Video => self.video_workers = count,
            TaskKind::Audio => self.audio_workers = count,
            TaskKind::Text => self.text_workers = count,
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_spawn_interval(mut self, interval_ms: u64) -> Self {
        self.spawn_interval_ms = interval_ms;
        self
    }

    /// Initial pool shape as (kind, count) pairs.
    pub fn workers(&self) -> [(TaskKind, usize); 4] {
        [
            (TaskKind::Image, self.image_workers),
            (TaskKind::Video, self.video_workers),
            (TaskKind::Audio, self.audio_workers),
            (TaskKind::Text, self.text_workers),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(RiverError::InvalidConfig(
                "tick_ms must be positive".to_string(),
            ));
        }
        if self.spawn_interval_ms == 0 {
            return Err(RiverError::InvalidConfig(
                "spawn_interval_ms must be positive".to_string(),
            ));
        }
        if self.max_tasks_per_client == 0 {
            return Err(RiverError::InvalidConfig(
                "max_tasks_per_client must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
