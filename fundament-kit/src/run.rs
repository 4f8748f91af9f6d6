use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, ensure, Context};
use fundament::{
    enumerate, hilbert_primal_from_rays, EnumerationOptions, EnumerationSummary, FundamentError,
    Integer, MatchingMatrix, ProgressTracker, ValidityConstraints, Vector,
};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub options: EnumerationOptions,
    /// Wall-clock budget; the run is cancelled once it elapses. A zero budget is already expired.
    pub deadline: Option<Duration>,
    /// Sort the collected vectors lexicographically.
    pub sort_output: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            options: EnumerationOptions::default(),
            deadline: None,
            sort_output: true,
        }
    }
}

impl RunConfig {
    pub fn new(options: EnumerationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_sort_output(mut self, sort: bool) -> Self {
        self.sort_output = sort;
        self
    }
}

#[derive(Clone, Debug)]
pub struct RunOutput {
    pub vectors: Vec<Vector<Integer>>,
    pub summary: EnumerationSummary,
    pub elapsed: Duration,
}

/// Runs `job` with a watcher thread that cancels `tracker` once `deadline` elapses, unless `job`
/// returns first.
fn with_deadline<T>(
    tracker: &ProgressTracker,
    deadline: Option<Duration>,
    job: impl FnOnce() -> T,
) -> T {
    let Some(deadline) = deadline else {
        return job();
    };
    if deadline.is_zero() {
        warn!("deadline already expired; cancelling before start");
        tracker.cancel();
        return job();
    }

    let done = Mutex::new(false);
    let signal = Condvar::new();
    thread::scope(|scope| {
        scope.spawn(|| {
            let guard = done.lock().unwrap_or_else(PoisonError::into_inner);
            let (guard, timeout) = signal
                .wait_timeout_while(guard, deadline, |finished| !*finished)
                .unwrap_or_else(PoisonError::into_inner);
            if timeout.timed_out() && !*guard {
                warn!(?deadline, "deadline reached; cancelling enumeration");
                tracker.cancel();
            }
        });
        let out = job();
        *done.lock().unwrap_or_else(PoisonError::into_inner) = true;
        signal.notify_all();
        out
    })
}

fn collect_with<F>(config: &RunConfig, what: &str, run: F) -> anyhow::Result<RunOutput>
where
    F: FnOnce(
        &ProgressTracker,
        &mut dyn FnMut(Vector<Integer>),
    ) -> Result<EnumerationSummary, FundamentError>,
{
    let tracker = ProgressTracker::new();
    let start = Instant::now();
    let mut vectors = Vec::new();
    let result = with_deadline(&tracker, config.deadline, || {
        run(&tracker, &mut |v| vectors.push(v))
    });
    let elapsed = start.elapsed();

    let summary = match result {
        Ok(summary) => summary,
        Err(FundamentError::Cancelled) => {
            return Err(anyhow!(
                "{what} cancelled after {elapsed:?} (deadline {:?})",
                config.deadline
            ));
        }
        Err(err) => return Err(err).with_context(|| format!("{what} failed")),
    };
    ensure!(
        summary.emitted == vectors.len(),
        "{what} reported {} vectors but delivered {}",
        summary.emitted,
        vectors.len()
    );
    if config.sort_output {
        vectors.sort();
    }
    debug!(what, emitted = vectors.len(), ?elapsed, "run collected");
    Ok(RunOutput {
        vectors,
        summary,
        elapsed,
    })
}

/// Enumerates into a `Vec`, honouring the configured deadline.
pub fn run_collect(
    matrix: &MatchingMatrix,
    constraints: &ValidityConstraints,
    config: &RunConfig,
) -> anyhow::Result<RunOutput> {
    let what = format!("{} enumeration", config.options.mode());
    collect_with(config, &what, |tracker, sink| {
        enumerate(matrix, constraints, &config.options, Some(tracker), sink)
    })
}

/// Expands known extreme rays to the Hilbert basis, honouring the configured deadline.
pub fn expand_collect(
    rays: &[Vector<Integer>],
    constraints: &ValidityConstraints,
    config: &RunConfig,
) -> anyhow::Result<RunOutput> {
    collect_with(config, "hilbert basis expansion", |tracker, sink| {
        hilbert_primal_from_rays(rays, constraints, &config.options, Some(tracker), sink)
    })
}
