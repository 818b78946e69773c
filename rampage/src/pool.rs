mod task_atomics;

use crate::hook::ITERATION_HOOK;
use crate::measurement::Measurement;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use task_atomics::TaskAtomics;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

struct Vu {
    id: u64,
    handle: JoinHandle<()>,
    stop: Arc<AtomicBool>,
}

impl Vu {
    fn retire(self, grace: Duration) -> RetiringVu {
        self.stop.store(true, Ordering::Relaxed);
        RetiringVu {
            vu: self,
            deadline: Instant::now() + grace,
        }
    }
}

/// A VU which no longer starts iterations but may still be finishing one.
struct RetiringVu {
    vu: Vu,
    deadline: Instant,
}

/// The set of running virtual users of one scenario.
pub(crate) struct VuPool<T> {
    scenario: T,
    active: Vec<Vu>,
    retiring: Vec<RetiringVu>,
    task_atomics: TaskAtomics,
    graceful_ramp_down: Duration,
    next_id: u64,
    max_vus: usize,
}

impl<T, F> VuPool<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send + 'static,
{
    pub fn new(scenario: T, max_rps: Option<NonZeroU32>, graceful_ramp_down: Duration) -> Self {
        Self {
            scenario,
            active: vec![],
            retiring: vec![],
            task_atomics: TaskAtomics::new(max_rps),
            graceful_ramp_down,
            next_id: 0,
            max_vus: 0,
        }
    }

    /// Grows or shrinks the active VUs to `vus`. Removed VUs retire gracefully.
    pub fn set_vus(&mut self, vus: usize) {
        self.active.retain(|vu| {
            if vu.handle.is_finished() {
                error!("VU {} exited unexpectedly; replacing it.", vu.id);
                false
            } else {
                true
            }
        });

        if self.active.len() > vus {
            trace!("Retiring {} VUs", self.active.len() - vus);
            let grace = self.graceful_ramp_down;
            let retired = self.active.drain(vus..).map(|vu| vu.retire(grace));
            self.retiring.extend(retired);
        }

        while self.active.len() < vus {
            let vu = self.spawn_vu();
            self.active.push(vu);
        }

        self.max_vus = self.max_vus.max(self.active.len());

        #[cfg(feature = "metrics")]
        metrics::gauge!("rampage_vus").set(self.active.len() as f64);
    }

    fn spawn_vu(&mut self) -> Vu {
        let id = self.next_id;
        self.next_id += 1;

        let scenario = self.scenario.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let task_stop = stop.clone();
        let data = self.task_atomics.clone_to_iteration_data();

        let handle = tokio::spawn(ITERATION_HOOK.scope(data.clone(), async move {
            while !task_stop.load(Ordering::Relaxed) {
                let start = Instant::now();
                scenario().await;
                data.record_iteration(start.elapsed());
            }
            trace!("VU {id} stopped");
        }));

        Vu { id, handle, stop }
    }

    /// Drops retired VUs that finished and interrupts those past their deadline.
    pub fn reap(&mut self) {
        let now = Instant::now();
        let task_atomics = &self.task_atomics;
        self.retiring.retain(|retiring| {
            if retiring.vu.handle.is_finished() {
                false
            } else if now >= retiring.deadline {
                debug!("Interrupting VU {} after graceful ramp-down", retiring.vu.id);
                retiring.vu.handle.abort();
                task_atomics.record_interrupted();
                false
            } else {
                true
            }
        });
    }

    pub fn vus(&self) -> usize {
        self.active.len()
    }

    pub fn max_vus(&self) -> usize {
        self.max_vus
    }

    pub fn collect(&self, elapsed: Duration) -> Measurement {
        self.task_atomics.collect(elapsed)
    }

    /// Stops every VU, giving in-flight iterations up to `graceful_stop` to complete. VUs still
    /// ramping down keep their earlier deadline when it comes sooner.
    pub async fn shutdown(&mut self, graceful_stop: Duration) {
        let stop_deadline = Instant::now() + graceful_stop;
        for retiring in &mut self.retiring {
            retiring.deadline = retiring.deadline.min(stop_deadline);
        }

        let retired = self.active.drain(..).map(|vu| vu.retire(graceful_stop));
        self.retiring.extend(retired);

        #[cfg(feature = "metrics")]
        metrics::gauge!("rampage_vus").set(0.);

        for RetiringVu { mut vu, deadline } in self.retiring.drain(..) {
            if timeout_at(deadline, &mut vu.handle).await.is_err() {
                debug!("Interrupting VU {} after graceful stop", vu.id);
                vu.handle.abort();
                self.task_atomics.record_interrupted();
            }
        }
    }
}

impl<T> Drop for VuPool<T> {
    fn drop(&mut self) {
        for vu in &self.active {
            vu.handle.abort();
        }
        for retiring in &self.retiring {
            retiring.vu.handle.abort();
        }
    }
}
