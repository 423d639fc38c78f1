use riverworks::scheduler::{Dispatcher, Priority, Task, TaskKind, TaskStatus, WorkerStatus};
use uuid::Uuid;

fn task(kind: TaskKind, vip: bool, required_ms: u64, now: u64) -> Task {
    Task::new(Uuid::new_v4(), kind, required_ms, vip, Priority::L1, now)
}

// ==================== submission / queue ordering ====================

#[test]
fn vip_tasks_group_at_the_front_fifo_within_class() {
    let mut dispatcher = Dispatcher::new();

    let a = dispatcher.submit(task(TaskKind::Image, false, 100, 0)).unwrap();
    let b = dispatcher.submit(task(TaskKind::Image, true, 100, 0)).unwrap();
    let c = dispatcher.submit(task(TaskKind::Image, false, 100, 0)).unwrap();
    let d = dispatcher.submit(task(TaskKind::Image, true, 100, 0)).unwrap();

    let order: Vec<Uuid> = dispatcher.pending_tasks().iter().map(|t| t.id).collect();
    assert_eq!(order, vec![b, d, a, c]);
}

#[test]
fn first_vip_becomes_head_of_non_vip_queue() {
    let mut dispatcher = Dispatcher::new();

    let a = dispatcher.submit(task(TaskKind::Image, false, 100, 0)).unwrap();
    let b = dispatcher.submit(task(TaskKind::Image, false, 100, 0)).unwrap();
    let v = dispatcher.submit(task(TaskKind::Video, true, 100, 0)).unwrap();

    let order: Vec<Uuid> = dispatcher.pending_tasks().iter().map(|t| t.id).collect();
    assert_eq!(order, vec![v, a, b]);
}

#[test]
fn submit_rejects_started_or_non_pending_tasks() {
    let mut dispatcher = Dispatcher::new();

    let mut started = task(TaskKind::Image, false, 100, 0);
    started.started_at = Some(5);
    assert!(dispatcher.submit(started).is_err());

    let mut done = task(TaskKind::Image, false, 100, 0);
    done.status = TaskStatus::Completed;
    assert!(dispatcher.submit(done).is_err());

    assert_eq!(dispatcher.queue_len(), 0);
}

// ==================== tick: assignment & completion ====================

#[test]
fn single_image_worker_serves_vip_then_non_vip() {
    let mut dispatcher = Dispatcher::new();
    let worker_id = dispatcher.add_worker(TaskKind::Image);

    let a = dispatcher.submit(task(TaskKind::Image, true, 1_000, 0)).unwrap();
    let b = dispatcher.submit(task(TaskKind::Image, false, 500, 0)).unwrap();

    // VIP precedence: the sole compatible worker picks up A first.
    dispatcher.tick(10);
    let worker = &dispatcher.workers()[0];
    assert_eq!(worker.id, worker_id);
    assert_eq!(worker.status, WorkerStatus::Working);
    assert_eq!(worker.current, Some(a));
    assert_eq!(dispatcher.task(&a).unwrap().status, TaskStatus::Processing);
    assert_eq!(dispatcher.task(&a).unwrap().started_at, Some(10));
    assert_eq!(dispatcher.pending_tasks()[0].id, b);

    // A finishes during this tick; assignment ran before progress, so B
    // waits one more tick for the worker to come free.
    dispatcher.tick(990);
    assert_eq!(dispatcher.task(&a).unwrap().status, TaskStatus::Completed);
    assert_eq!(dispatcher.workers()[0].status, WorkerStatus::Idle);
    assert_eq!(dispatcher.queue_len(), 1);

    dispatcher.tick(500);
    assert_eq!(dispatcher.task(&b).unwrap().status, TaskStatus::Completed);
    assert_eq!(dispatcher.completed(TaskKind::Image), 2);
    assert_eq!(dispatcher.queue_len(), 0);
}

#[test]
fn progress_is_monotonic_and_completion_happens_once() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);
    let id = dispatcher.submit(task(TaskKind::Image, false, 300, 0)).unwrap();

    let mut last_remaining = dispatcher.task(&id).unwrap().remaining_ms;
    for _ in 0..5 {
        dispatcher.tick(100);
        let remaining = dispatcher.task(&id).unwrap().remaining_ms;
        assert!(remaining <= last_remaining);
        last_remaining = remaining;
    }

    assert_eq!(dispatcher.task(&id).unwrap().status, TaskStatus::Completed);
    assert_eq!(dispatcher.completed(TaskKind::Image), 1);

    // Completed tasks never re-enter the queue or the counter.
    dispatcher.tick(1_000);
    assert_eq!(dispatcher.completed(TaskKind::Image), 1);
    assert_eq!(dispatcher.queue_len(), 0);
}

#[test]
fn overshoot_tick_still_completes() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Video);
    let id = dispatcher.submit(task(TaskKind::Video, false, 100, 0)).unwrap();

    dispatcher.tick(250);
    let task = dispatcher.task(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(task.remaining_ms <= 0);
    assert_eq!(task.progress(), 1.0);
}

#[test]
fn zero_delta_tick_assigns_but_makes_no_progress() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);
    let id = dispatcher.submit(task(TaskKind::Image, false, 100, 0)).unwrap();

    dispatcher.tick(0);
    let task = dispatcher.task(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Processing);
    assert_eq!(task.remaining_ms, 100);
}

// ==================== aging / starvation ====================

#[test]
fn starved_task_stays_pending_and_warns_past_threshold() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);

    // No audio worker exists: the task starves by design, without error.
    let id = dispatcher.submit(task(TaskKind::Audio, false, 100, 0)).unwrap();

    // now = 300: waited exactly 3x required, threshold not yet crossed.
    for _ in 0..3 {
        dispatcher.tick(100);
    }
    let task_ref = dispatcher.task(&id).unwrap();
    assert_eq!(task_ref.status, TaskStatus::Pending);
    assert!(!task_ref.warning);

    // now = 400: past the threshold, warning set and sticky.
    dispatcher.tick(100);
    assert!(dispatcher.task(&id).unwrap().warning);

    for _ in 0..50 {
        dispatcher.tick(100);
    }
    let task_ref = dispatcher.task(&id).unwrap();
    assert_eq!(task_ref.status, TaskStatus::Pending);
    assert!(task_ref.warning);
    assert_eq!(dispatcher.queue_len(), 1);
}

#[test]
fn task_stamped_ahead_of_the_clock_just_waits() {
    let mut dispatcher = Dispatcher::new();

    // The dispatcher clock starts at zero; a task created against a later
    // clock reading must neither panic the aging check nor warn early.
    let id = dispatcher.submit(task(TaskKind::Audio, false, 100, 5_000)).unwrap();
    dispatcher.tick(10);
    let task_ref = dispatcher.task(&id).unwrap();
    assert_eq!(task_ref.status, TaskStatus::Pending);
    assert!(!task_ref.warning);

    // Once the clock catches up, the usual 3x threshold applies.
    // now = 5_210: waited 210ms of the 300ms window, no warning yet.
    for _ in 0..52 {
        dispatcher.tick(100);
    }
    assert!(!dispatcher.task(&id).unwrap().warning);

    // now = 5_310: waited 310ms, past the threshold.
    dispatcher.tick(100);
    assert!(dispatcher.task(&id).unwrap().warning);
}

#[test]
fn assigned_tasks_do_not_age() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Video);
    let id = dispatcher.submit(task(TaskKind::Video, false, 100, 0)).unwrap();

    // First task is picked up immediately; the long one queues behind it
    // but gets started well inside its own 3x window, so neither warns.
    dispatcher.tick(10);
    let long = dispatcher.submit(task(TaskKind::Video, false, 10_000, 10)).unwrap();
    for _ in 0..40 {
        dispatcher.tick(1_000);
    }
    assert_eq!(dispatcher.task(&id).unwrap().status, TaskStatus::Completed);
    assert!(!dispatcher.task(&long).unwrap().warning);
}

// ==================== worker pool resize / eviction ====================

#[test]
fn removing_idle_worker_leaves_queue_untouched() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);
    dispatcher.submit(task(TaskKind::Video, false, 100, 0)).unwrap();

    let removed = dispatcher.remove_worker(TaskKind::Image);
    assert!(removed.is_some());
    assert_eq!(dispatcher.worker_count(TaskKind::Image), 0);
    assert_eq!(dispatcher.queue_len(), 1);
}

#[test]
fn forced_eviction_preserves_progress_and_requeues_at_front() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);

    let evicted = dispatcher.submit(task(TaskKind::Image, false, 1_000, 0)).unwrap();
    dispatcher.tick(700);
    assert_eq!(dispatcher.task(&evicted).unwrap().remaining_ms, 300);

    // A VIP waits in the queue; the evicted task must still land ahead of it.
    let vip = dispatcher.submit(task(TaskKind::Image, true, 100, 700)).unwrap();

    let removed = dispatcher.remove_worker(TaskKind::Image);
    assert!(removed.is_some());
    assert!(dispatcher.workers().is_empty());

    let task_ref = dispatcher.task(&evicted).unwrap();
    assert_eq!(task_ref.status, TaskStatus::Pending);
    assert_eq!(task_ref.started_at, None);
    assert_eq!(task_ref.remaining_ms, 300);

    let order: Vec<Uuid> = dispatcher.pending_tasks().iter().map(|t| t.id).collect();
    assert_eq!(order, vec![evicted, vip]);
}

#[test]
fn evicted_task_resumes_with_partial_progress() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);

    let id = dispatcher.submit(task(TaskKind::Image, false, 1_000, 0)).unwrap();
    dispatcher.tick(600);
    dispatcher.remove_worker(TaskKind::Image);

    // A new worker picks the task back up; only the leftover 400ms remain.
    dispatcher.add_worker(TaskKind::Image);
    dispatcher.tick(100);
    let task_ref = dispatcher.task(&id).unwrap();
    assert_eq!(task_ref.status, TaskStatus::Processing);
    assert_eq!(task_ref.remaining_ms, 300);

    dispatcher.tick(300);
    assert_eq!(dispatcher.task(&id).unwrap().status, TaskStatus::Completed);
}

#[test]
fn remove_worker_without_match_is_a_noop() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);

    assert!(dispatcher.remove_worker(TaskKind::Text).is_none());
    assert_eq!(dispatcher.workers().len(), 1);
}

#[test]
fn busy_worker_only_evicted_when_no_idle_candidate() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);
    dispatcher.add_worker(TaskKind::Image);

    let id = dispatcher.submit(task(TaskKind::Image, false, 1_000, 0)).unwrap();
    dispatcher.tick(100);

    // One worker is busy, one idle: the idle one goes, work continues.
    dispatcher.remove_worker(TaskKind::Image);
    assert_eq!(dispatcher.worker_count(TaskKind::Image), 1);
    assert_eq!(dispatcher.task(&id).unwrap().status, TaskStatus::Processing);
    assert_eq!(dispatcher.queue_len(), 0);
}

// ==================== queries ====================

#[test]
fn worker_progress_reports_done_fraction() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);
    dispatcher.submit(task(TaskKind::Image, false, 1_000, 0)).unwrap();

    dispatcher.tick(250);
    let worker = &dispatcher.workers()[0];
    let progress = dispatcher.worker_progress(worker).unwrap();
    assert!((progress - 0.25).abs() < f64::EPSILON);

    dispatcher.tick(750);
    let worker = &dispatcher.workers()[0];
    assert!(dispatcher.worker_progress(worker).is_none());
}

#[test]
fn completion_counters_are_keyed_by_kind() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add_worker(TaskKind::Image);
    dispatcher.add_worker(TaskKind::Video);

    dispatcher.submit(task(TaskKind::Image, false, 100, 0)).unwrap();
    dispatcher.submit(task(TaskKind::Image, false, 100, 0)).unwrap();
    dispatcher.submit(task(TaskKind::Video, false, 100, 0)).unwrap();

    for _ in 0..4 {
        dispatcher.tick(100);
    }

    assert_eq!(dispatcher.completed(TaskKind::Image), 2);
    assert_eq!(dispatcher.completed(TaskKind::Video), 1);
    assert_eq!(dispatcher.completed(TaskKind::Audio), 0);
    assert_eq!(dispatcher.completed_total(), 3);
}
