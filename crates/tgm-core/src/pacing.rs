//! Rate governor: turns progress counters into mandatory pauses.
//!
//! Two independent timers: a short pause after every invite attempt (burst rate)
//! and a long pause every `chunk_size` attempts (sustained rate). They add up.

use std::{
    io::Write,
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::sleep;

use crate::ports::Sleeper;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Pause after every single invite attempt, successful or not.
    pub wait_between_operation: Duration,
    /// Extra pause every `chunk_size` attempts.
    pub wait_between_chunks: Duration,
    pub chunk_size: usize,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            wait_between_operation: Duration::from_secs(120),
            wait_between_chunks: Duration::from_secs(900),
            chunk_size: 35,
        }
    }
}

#[derive(Clone)]
pub struct RateGovernor {
    policy: PacingPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RateGovernor {
    pub fn new(policy: PacingPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> PacingPolicy {
        self.policy
    }

    /// True when `processed` attempts close a chunk and the next one must wait.
    pub fn is_chunk_boundary(&self, processed: usize) -> bool {
        processed > 0 && self.policy.chunk_size > 0 && processed % self.policy.chunk_size == 0
    }

    pub async fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        self.sleeper.sleep(duration).await;
    }

    pub async fn operation_pause(&self) {
        tracing::info!(
            wait_secs = self.policy.wait_between_operation.as_secs(),
            "waiting between operations"
        );
        self.pause(self.policy.wait_between_operation).await;
    }

    pub async fn chunk_pause(&self) {
        tracing::info!(
            wait_secs = self.policy.wait_between_chunks.as_secs(),
            "waiting between chunks"
        );
        self.pause(self.policy.wait_between_chunks).await;
    }
}

/// Real suspension with an optional one-second countdown on stdout.
#[derive(Clone, Copy, Debug)]
pub struct CountdownSleeper {
    show_countdown: bool,
}

impl CountdownSleeper {
    pub fn new(show_countdown: bool) -> Self {
        Self { show_countdown }
    }

    pub fn shows_countdown(&self) -> bool {
        self.show_countdown
    }
}

#[async_trait]
impl Sleeper for CountdownSleeper {
    async fn sleep(&self, duration: Duration) {
        if !self.show_countdown {
            sleep(duration).await;
            return;
        }

        let mut remaining = duration.as_secs();
        let mut out = std::io::stdout();
        while remaining > 0 {
            let _ = write!(out, "\rSleeping for {}", format_countdown(remaining));
            let _ = out.flush();
            sleep(Duration::from_secs(1)).await;
            remaining -= 1;
        }
        // Sub-second remainder (rare: classifier waits are whole seconds).
        let rest = duration.saturating_sub(Duration::from_secs(duration.as_secs()));
        if !rest.is_zero() {
            sleep(rest).await;
        }
        let _ = writeln!(out);
    }
}

/// `H:MM:SS`, hours unpadded.
pub fn format_countdown(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{mins:02}:{secs:02}")
}
