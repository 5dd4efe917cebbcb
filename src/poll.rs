//! Deadline-bounded polling for asynchronous server-side jobs.
//!
//! The delay between attempts grows linearly and is capped; there is no
//! jitter and no attempt limit other than the deadline.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;

use crate::error::{ClientError, ClientResult};

/// Delay before the second attempt.
pub const INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for the delay between attempts.
pub const MAX_DELAY: Duration = Duration::from_secs(5);

/// Growth of the delay after every attempt.
pub const DELAY_INCREMENT: Duration = Duration::from_secs(1);

/// Time source for the poller. Sleeping is the only place a poll blocks.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub increment: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: INITIAL_DELAY,
            max: MAX_DELAY,
            increment: DELAY_INCREMENT,
        }
    }
}

impl Backoff {
    pub fn first_delay(&self) -> Duration {
        self.initial.min(self.max)
    }

    pub fn next_delay(&self, current: Duration) -> Duration {
        (current + self.increment).min(self.max)
    }

    /// The sequence of delays a poll sleeps between attempts.
    pub fn delays(self) -> impl Iterator<Item = Duration> {
        std::iter::successors(Some(self.first_delay()), move |d| Some(self.next_delay(*d)))
    }
}

/// Outcome of one readiness probe.
#[derive(Debug)]
pub enum Probe<T> {
    Ready(T),
    /// Not ready yet, optionally with the error that made it so.
    NotReady(Option<ClientError>),
}

pub struct Poller<C: Clock = TokioClock> {
    clock: C,
    backoff: Backoff,
}

impl Poller<TokioClock> {
    pub fn new() -> Self {
        Self::with_clock(TokioClock, Backoff::default())
    }
}

impl Default for Poller<TokioClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Poller<C> {
    pub fn with_clock(clock: C, backoff: Backoff) -> Self {
        Self { clock, backoff }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Calls `probe` until it reports ready, it fails, or `timeout` elapses.
    ///
    /// The deadline is checked only after a not-ready answer: once it has
    /// passed (reaching it exactly is not enough) the poll fails with [`ClientError::Timeout`] without sleeping
    /// again. Errors returned by `probe` itself end the poll immediately.
    pub async fn poll<T, F, Fut>(
        &self,
        operation: &str,
        timeout: Duration,
        mut probe: F,
    ) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<Probe<T>>>,
    {
        let started = self.clock.now();
        let deadline = started + timeout;
        let mut delay = self.backoff.first_delay();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let reason = match probe().await? {
                Probe::Ready(value) => {
                    debug!("{}: ready after {} attempt(s)", operation, attempt);
                    return Ok(value);
                }
                Probe::NotReady(reason) => reason,
            };

            let now = self.clock.now();
            if now > deadline {
                return Err(ClientError::Timeout {
                    operation: operation.to_string(),
                    elapsed: now.duration_since(started),
                    last_error: reason.map(Box::new),
                });
            }

            match &reason {
                Some(err) => debug!(
                    "{}: not ready ({}), retrying in {:?}...",
                    operation, err, delay
                ),
                None => debug!("{}: not ready yet, retrying in {:?}...", operation, delay),
            }
            self.clock.sleep(delay).await;
            delay = self.backoff.next_delay(delay);
        }
    }
}
