use std::collections::HashMap;

use uuid::Uuid;

use crate::scheduler::task::{Task, TaskStatus};

/// The single arena of task records. Clients and the dispatcher hold `Uuid`
/// handles into this table; a task record never exists anywhere else, so a
/// status change is visible to every holder at once.
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: HashMap<Uuid, Task>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: Task) -> Uuid {
        let id = task.id;
        self.tasks.insert(id, task);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Remove the given tasks, but only those that have completed. Used when
    /// a client retires; in-flight records are never released this way.
    pub fn release_completed(&mut self, ids: &[Uuid]) -> usize {
        let mut released = 0;
        for id in ids {
            if self
                .tasks
                .get(id)
                .is_some_and(|t| t.status == TaskStatus::Completed)
            {
                self.tasks.remove(id);
                released += 1;
            }
        }
        released
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
