use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::client::{Client, ClientConfig};
use crate::scheduler::task::{Priority, TaskKind};

const LABEL_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LABEL_DIGITS: &[u8] = b"0123456789";

/// Random arrival process: produces at most one new client per firing of a
/// configurable interval, plus the random parameters of its opening tasks.
/// All randomness lives here, behind a seeded RNG — the scheduler core only
/// ever sees fully-formed clients and tasks.
#[derive(Debug)]
pub struct Spawner {
    timer_ms: u64,
    interval_ms: u64,
    max_tasks: usize,
    rng: StdRng,
}

impl Spawner {
    pub fn new(interval_ms: u64, max_tasks: usize, seed: u64) -> Self {
        Self {
            timer_ms: 0,
            interval_ms,
            max_tasks: max_tasks.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn set_interval(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Advance the spawn timer by one tick delta. At most one client is
    /// produced per call; the timer resets when it fires.
    pub fn update(&mut self, delta_ms: u64) -> Option<Client> {
        self.timer_ms += delta_ms;
        if self.timer_ms < self.interval_ms {
            return None;
        }
        self.timer_ms = 0;
        Some(self.random_client())
    }

    fn random_client(&mut self) -> Client {
        let is_l2 = self.rng.random_bool(0.3);
        Client::new(ClientConfig {
            id: Uuid::new_v4(),
            label: self.random_label(),
            priority: if is_l2 { Priority::L2 } else { Priority::L1 },
            vip: self.rng.random_bool(0.2),
            budget: self.rng.random_range(100..1100),
            max_concurrency: if is_l2 { 2 } else { 1 },
        })
    }

    fn random_label(&mut self) -> String {
        let mut label = String::with_capacity(6);
        for _ in 0..4 {
            label.push(LABEL_LETTERS[self.rng.random_range(0..LABEL_LETTERS.len())] as char);
        }
        for _ in 0..2 {
            label.push(LABEL_DIGITS[self.rng.random_range(0..LABEL_DIGITS.len())] as char);
        }
        label
    }

    /// Parameters for one opening task: mostly short image jobs, one in five
    /// a long video render.
    pub fn random_order(&mut self) -> (TaskKind, u64) {
        if self.rng.random_bool(0.2) {
            (TaskKind::Video, 120_000)
        } else {
            (TaskKind::Image, 10_000)
        }
    }

    /// How many tasks a freshly arrived client tries to open.
    pub fn task_batch_size(&mut self) -> usize {
        self.rng.random_range(1..=self.max_tasks)
    }
}
