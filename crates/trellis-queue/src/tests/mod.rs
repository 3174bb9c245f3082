//! Scheduling tests for the dependency-aware queue.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::{DependencyKey, MessageQueue, QueueError};

const PATIENCE: Duration = Duration::from_secs(5);

/// Key that conflicts whenever the resource sets intersect.
#[derive(Debug, Clone)]
struct Resources(BTreeSet<&'static str>);

impl Resources {
    fn of(names: &[&'static str]) -> Self {
        Self(names.iter().copied().collect())
    }
}

impl DependencyKey for Resources {
    fn conflicts_with(&self, earlier: &Self) -> bool {
        !self.0.is_disjoint(&earlier.0)
    }
}

/// Tracks how many jobs run at once.
#[derive(Clone, Default)]
struct Occupancy {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Occupancy {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[fixture]
fn queue() -> MessageQueue<Resources> {
    MessageQueue::new()
}

#[rstest]
fn conflicting_items_run_in_submission_order(queue: MessageQueue<Resources>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let completions: Vec<_> = (0..8)
        .map(|index| {
            let entries = Arc::clone(&log);
            queue.submit(Resources::of(&["target"]), move || {
                thread::sleep(Duration::from_millis(2));
                entries.lock().expect("log lock").push(index);
            })
        })
        .collect();

    for completion in completions {
        completion.wait().expect("job completes");
    }
    assert_eq!(*log.lock().expect("log lock"), (0..8).collect::<Vec<_>>());
}

#[rstest]
fn conflicting_items_never_overlap(queue: MessageQueue<Resources>) {
    let occupancy = Occupancy::default();
    for _ in 0..6 {
        let tracker = occupancy.clone();
        drop(queue.submit(Resources::of(&["a", "b"]), move || {
            tracker.enter();
            thread::sleep(Duration::from_millis(5));
            tracker.leave();
        }));
    }
    assert!(queue.wait_until_idle_timeout(PATIENCE));
    assert_eq!(occupancy.peak(), 1);
}

#[rstest]
fn disjoint_items_start_before_either_completes(queue: MessageQueue<Resources>) {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_a_tx, release_a_rx) = mpsc::channel::<()>();
    let (release_b_tx, release_b_rx) = mpsc::channel::<()>();

    let first = {
        let started = started_tx.clone();
        queue.submit(Resources::of(&["a"]), move || {
            started.send("a").expect("report start");
            release_a_rx.recv_timeout(PATIENCE).is_ok()
        })
    };
    let second = queue.submit(Resources::of(&["b"]), move || {
        started_tx.send("b").expect("report start");
        release_b_rx.recv_timeout(PATIENCE).is_ok()
    });

    let mut started = BTreeSet::new();
    started.insert(started_rx.recv_timeout(PATIENCE).expect("first start"));
    started.insert(started_rx.recv_timeout(PATIENCE).expect("second start"));
    assert_eq!(started, BTreeSet::from(["a", "b"]));

    release_a_tx.send(()).expect("release a");
    release_b_tx.send(()).expect("release b");
    assert_eq!(first.wait(), Ok(true));
    assert_eq!(second.wait(), Ok(true));
}

#[rstest]
fn blocked_item_does_not_hold_back_unrelated_work(queue: MessageQueue<Resources>) {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let blocker = queue.submit(Resources::of(&["x"]), move || {
        release_rx.recv_timeout(PATIENCE).is_ok()
    });
    let waiting = queue.submit(Resources::of(&["x"]), || "after blocker");
    let unrelated = queue.submit(Resources::of(&["y"]), || "unrelated");

    assert_eq!(unrelated.wait_timeout(PATIENCE), Ok(Some("unrelated")));
    assert_eq!(waiting.wait_timeout(Duration::from_millis(20)), Ok(None));

    release_tx.send(()).expect("release blocker");
    assert_eq!(blocker.wait(), Ok(true));
    assert_eq!(waiting.wait(), Ok("after blocker"));
}

#[rstest]
fn item_waits_for_every_conflicting_predecessor(queue: MessageQueue<Resources>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let record = |label: &'static str, delay: u64| {
        let entries = Arc::clone(&log);
        move || {
            thread::sleep(Duration::from_millis(delay));
            entries.lock().expect("log lock").push(label);
        }
    };

    drop(queue.submit(Resources::of(&["a"]), record("a", 20)));
    drop(queue.submit(Resources::of(&["b"]), record("b", 10)));
    drop(queue.submit(Resources::of(&["a", "b"]), record("ab", 0)));
    assert!(queue.wait_until_idle_timeout(PATIENCE));

    let finished = log.lock().expect("log lock");
    assert_eq!(finished.last(), Some(&"ab"));
}

#[rstest]
fn panicking_job_is_confined_to_its_completion(queue: MessageQueue<Resources>) {
    let failed = queue.submit(Resources::of(&["shared"]), || -> u32 {
        panic!("intentional job failure")
    });
    let later = queue.submit(Resources::of(&["shared"]), || 7_u32);

    assert_eq!(failed.wait(), Err(QueueError::Abandoned));
    assert_eq!(later.wait(), Ok(7));
}

#[rstest]
fn concurrency_limit_bounds_parallelism() {
    let queue = MessageQueue::with_limit(NonZeroUsize::new(1));
    let occupancy = Occupancy::default();
    for name in ["a", "b", "c", "d"] {
        let tracker = occupancy.clone();
        drop(queue.submit(Resources::of(&[name]), move || {
            tracker.enter();
            thread::sleep(Duration::from_millis(5));
            tracker.leave();
        }));
    }
    assert!(queue.wait_until_idle_timeout(PATIENCE));
    assert_eq!(occupancy.peak(), 1);
}

#[rstest]
fn reports_pending_and_running_counts(queue: MessageQueue<Resources>) {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();
    drop(queue.submit(Resources::of(&["k"]), move || {
        started_tx.send(()).expect("report start");
        release_rx.recv_timeout(PATIENCE).is_ok()
    }));
    drop(queue.submit(Resources::of(&["k"]), || ()));

    started_rx.recv_timeout(PATIENCE).expect("first job started");
    assert_eq!(queue.running_len(), 1);
    assert_eq!(queue.pending_len(), 1);

    release_tx.send(()).expect("release");
    assert!(queue.wait_until_idle_timeout(PATIENCE));
    assert_eq!(queue.running_len(), 0);
    assert_eq!(queue.pending_len(), 0);
}

#[rstest]
fn idle_queue_returns_immediately(queue: MessageQueue<Resources>) {
    assert!(queue.wait_until_idle_timeout(Duration::ZERO));
    queue.wait_until_idle();
}
