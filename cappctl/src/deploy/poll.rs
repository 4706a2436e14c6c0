//! Fixed-interval polling of parlay task state

use std::future::Future;
use std::time::{Duration, Instant};

use plunder_api::models::TreasureMap;
use tracing::debug;

use crate::deploy::progress::{Phase, Progress};
use crate::errors::CappError;
use crate::http::client::{Gateway, PlunderClient};
use crate::models::task::TaskState;

/// Poll options
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay before each poll
    pub interval: Duration,

    /// Give up after this many polls. `None` waits forever.
    pub max_attempts: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

/// What a phase waits for
pub struct Watch<'a> {
    pub phase: Phase,

    /// Host whose parlay log is polled
    pub address: &'a str,

    /// Submitted again before every poll when set
    pub resubmit: Option<&'a TreasureMap>,

    /// States that end the wait
    pub ends_wait: fn(&TaskState) -> bool,
}

/// Result of a wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A state accepted by `ends_wait` was observed
    Finished { state: TaskState, elapsed: Duration },

    /// The attempt budget ran out first
    TimedOut { attempts: u32 },
}

/// Sleep, then poll the task log, until `ends_wait` accepts the state or the
/// attempt budget is spent. Any API error ends the wait immediately.
pub async fn wait_for_task<G, S, F>(
    client: &PlunderClient<G>,
    watch: &Watch<'_>,
    options: &PollOptions,
    started: Instant,
    progress: &dyn Progress,
    sleep_fn: &S,
) -> Result<PollOutcome, CappError>
where
    G: Gateway,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let mut attempts = 0u32;

    loop {
        if let Some(max) = options.max_attempts {
            if attempts >= max {
                return Ok(PollOutcome::TimedOut { attempts });
            }
        }

        if let Some(task) = watch.resubmit {
            client.submit_task(task).await?;
        }

        sleep_fn(options.interval).await;
        attempts += 1;

        let (state, log) = client.task_log(watch.address).await?;
        debug!(phase = ?watch.phase, attempt = attempts, %state, "Polled task state");
        if !log.log.is_empty() {
            debug!("{}", log.log.trim_end());
        }

        let elapsed = started.elapsed();
        if (watch.ends_wait)(&state) {
            return Ok(PollOutcome::Finished { state, elapsed });
        }
        progress.waiting(watch.phase, elapsed, &state);
    }
}
