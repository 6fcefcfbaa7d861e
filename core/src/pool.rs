//! Fixed-size worker pool.
//!
//! `size` tasks pull work items from one shared queue until it is empty (or a
//! stop is requested) and send each result over a channel. Work items are
//! pulled lazily, so a large address range is never materialised up front.
//!
//! A worker that panics is logged and replaced; only the item it was holding
//! is lost, and that loss is reported in [`PoolReport::lost`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Cooperative stop flag shared between a coordinator and its workers.
///
/// Workers check it before taking the next item; probes already in flight run
/// to their own timeout.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct PoolReport<R> {
    /// One entry per completed item, in completion order.
    pub results: Vec<R>,
    /// Items whose worker panicked mid-flight.
    pub lost: usize,
}

pub struct WorkerPool {
    size: usize,
    stop: StopHandle,
}

impl WorkerPool {
    pub fn new(size: usize, stop: StopHandle) -> Self {
        Self {
            size: size.max(1),
            stop,
        }
    }

    pub async fn run<I, T, R, F, Fut>(&self, items: I, work: F) -> PoolReport<R>
    where
        I: Iterator<Item = T> + Send + 'static,
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let queue = Arc::new(Mutex::new(items));
        let work = Arc::new(work);
        let (tx, mut rx) = mpsc::unbounded_channel::<R>();
        let mut workers: JoinSet<()> = JoinSet::new();

        for _ in 0..self.size {
            spawn_worker(&mut workers, &queue, &work, &tx, &self.stop);
        }

        let mut lost: usize = 0;
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    error!("probe worker panicked, replacing it: {e}");
                    lost += 1;
                    spawn_worker(&mut workers, &queue, &work, &tx, &self.stop);
                } else {
                    error!("probe worker was cancelled: {e}");
                }
            }
        }
        drop(tx);

        let mut results: Vec<R> = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        debug!(completed = results.len(), lost, "worker pool drained");

        PoolReport { results, lost }
    }
}

fn spawn_worker<I, T, R, F, Fut>(
    workers: &mut JoinSet<()>,
    queue: &Arc<Mutex<I>>,
    work: &Arc<F>,
    tx: &mpsc::UnboundedSender<R>,
    stop: &StopHandle,
) where
    I: Iterator<Item = T> + Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let queue = Arc::clone(queue);
    let work = Arc::clone(work);
    let tx = tx.clone();
    let stop = stop.clone();

    workers.spawn(async move {
        loop {
            if stop.is_stopped() {
                break;
            }
            // The lock is released before the probe is awaited.
            let next: Option<T> = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .next();
            let Some(item) = next else {
                break;
            };
            if tx.send(work(item).await).is_err() {
                break;
            }
        }
    });
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn every_item_is_processed_exactly_once() {
        let pool = WorkerPool::new(8, StopHandle::new());
        let report = pool.run(0u32..500, |n| async move { n }).await;

        let mut seen = report.results;
        seen.sort_unstable();
        assert_eq!(seen, (0u32..500).collect::<Vec<_>>());
        assert_eq!(report.lost, 0);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_pool_size() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let pool = WorkerPool::new(4, StopHandle::new());
        let (flight, top) = (in_flight.clone(), peak.clone());
        pool.run(0..40, move |_| {
            let flight = flight.clone();
            let top = top.clone();
            async move {
                let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
                top.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak concurrency was {peak}");
        assert!(peak >= 2);
    }

    #[tokio::test]
    async fn stop_prevents_new_work() {
        let stop = StopHandle::new();
        stop.stop();
        let report = WorkerPool::new(4, stop).run(0..100, |n| async move { n }).await;
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn panicking_item_is_isolated() {
        let pool = WorkerPool::new(2, StopHandle::new());
        let report = pool
            .run(0u32..20, |n| async move {
                if n == 7 {
                    panic!("simulated probe bug");
                }
                n
            })
            .await;

        assert_eq!(report.lost, 1);
        assert_eq!(report.results.len(), 19);
        assert!(!report.results.contains(&7));
    }

    #[tokio::test]
    async fn stop_mid_run_leaves_the_queue_undrained() {
        let stop = StopHandle::new();
        let pool = WorkerPool::new(4, stop.clone());
        let started = Arc::new(AtomicUsize::new(0));

        let counter = started.clone();
        let report = pool
            .run(0u32..1000, move |n| {
                let counter = counter.clone();
                let stop = stop.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) + 1 == 50 {
                        stop.stop();
                    }
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    n
                }
            })
            .await;

        // The other three workers may each have taken one more item.
        let started = started.load(Ordering::SeqCst);
        assert!((50..=53).contains(&started), "{started} items started");
        assert_eq!(report.results.len(), started);
    }
}
