use proptest::prelude::*;
use riverworks::scheduler::{Dispatcher, Priority, Task, TaskKind};
use uuid::Uuid;

fn mk_task(vip: bool) -> Task {
    Task::new(Uuid::new_v4(), TaskKind::Image, 1_000, vip, Priority::L1, 0)
}

proptest! {
    /// For any submission sequence, the queue is always two contiguous
    /// classes: every VIP index precedes every non-VIP index, and each
    /// class preserves submission order.
    #[test]
    fn queue_is_always_two_ordered_classes(flags in proptest::collection::vec(any::<bool>(), 0..64)) {
        let mut dispatcher = Dispatcher::new();
        let mut vips = Vec::new();
        let mut rest = Vec::new();

        for &vip in &flags {
            let task = mk_task(vip);
            let id = task.id;
            dispatcher.submit(task).unwrap();
            if vip {
                vips.push(id);
            } else {
                rest.push(id);
            }

            // The two-class invariant holds after every single submit.
            let queue = dispatcher.pending_tasks();
            let boundary = queue.iter().position(|t| !t.vip).unwrap_or(queue.len());
            prop_assert!(queue[..boundary].iter().all(|t| t.vip));
            prop_assert!(queue[boundary..].iter().all(|t| !t.vip));
        }

        let order: Vec<Uuid> = dispatcher.pending_tasks().iter().map(|t| t.id).collect();
        let expected: Vec<Uuid> = vips.into_iter().chain(rest).collect();
        prop_assert_eq!(order, expected);
    }

    /// Draining the queue through a single compatible worker serves the
    /// whole VIP class before any non-VIP task.
    #[test]
    fn single_worker_serves_vip_class_first(flags in proptest::collection::vec(any::<bool>(), 1..24)) {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add_worker(TaskKind::Image);

        let mut vip_total = 0u64;
        for &vip in &flags {
            dispatcher.submit(mk_task(vip)).unwrap();
            if vip {
                vip_total += 1;
            }
        }

        // Each task needs 1000ms; one tick to finish it, one to pick up the
        // next. Drain the first `vip_total` completions and check no
        // non-VIP has finished yet.
        let mut completed = 0u64;
        while completed < vip_total {
            dispatcher.tick(1_000);
            completed = dispatcher.completed(TaskKind::Image);
            let non_vip_done = dispatcher
                .tasks()
                .filter(|t| !t.vip && t.remaining_ms <= 0)
                .count();
            prop_assert_eq!(non_vip_done, 0);
        }
    }
}
