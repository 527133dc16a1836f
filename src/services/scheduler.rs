use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

/// Lets at most one closure run at a time; late callers are turned away.
#[derive(Debug, Default)]
pub struct SingleFlight {
    running: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run `f` unless another run is in progress, in which case return `None`
    pub fn try_run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        // Released on drop so a panicking job does not wedge the flag
        let _release = Release(&self.running);
        Some(f())
    }
}

struct Release<'a>(&'a AtomicBool);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fires a job immediately and then once per interval until told to stop.
pub struct Scheduler {
    interval: Duration,
    flight: Arc<SingleFlight>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            flight: Arc::new(SingleFlight::new()),
        }
    }

    /// Block until `shutdown` yields a message or its sender is dropped.
    ///
    /// Each firing runs on its own thread; a firing that finds the previous
    /// one still in flight is skipped. Running jobs are not waited for.
    pub fn run<F>(&self, job: F, shutdown: &Receiver<()>)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let job = Arc::new(job);

        info!(interval_secs = self.interval.as_secs(), "scheduler started");
        self.launch(&job);

        loop {
            match shutdown.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => self.launch(&job),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    info!("scheduler stopping");
                    return;
                }
            }
        }
    }

    fn launch<F>(&self, job: &Arc<F>)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let job = Arc::clone(job);
        let flight = Arc::clone(&self.flight);

        let spawned = thread::Builder::new()
            .name("tick".to_string())
            .spawn(move || {
                if flight.try_run(|| (*job)()).is_none() {
                    warn!("previous tick still running, skipping this one");
                }
            });

        if let Err(e) = spawned {
            error!(error = %e, "cannot start tick thread");
        }
    }
}
