//! Failure classifier: maps a platform fault to a per-member outcome.

use std::{ops::RangeInclusive, sync::OnceLock, time::Duration};

use rand::Rng;
use regex::Regex;

use crate::errors::Fault;

/// Random jitter added on top of a server-suggested wait, in seconds.
pub const WAIT_JITTER_SECS: RangeInclusive<u64> = 60..=180;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Rate limited; skip and fall back to default pacing.
    Flood,
    /// Target's privacy settings forbid the invite; permanent skip.
    PrivacyRestricted,
    /// Anything else; wait as hinted by the message.
    Unclassified,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Flood => "flood",
            FailureKind::PrivacyRestricted => "privacy_restricted",
            FailureKind::Unclassified => "unclassified",
        }
    }
}

/// Result of a single invite attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Added,
    AlreadyPresent,
    /// The member is skipped for this run; `wait` is paused on top of default pacing.
    Retryable { kind: FailureKind, wait: Duration },
    /// The session cannot continue.
    Fatal,
}

impl Outcome {
    /// Whether this outcome counts against the error budget.
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Retryable { .. } | Outcome::Fatal)
    }

    pub fn extra_wait(&self) -> Duration {
        match self {
            Outcome::Retryable { wait, .. } => *wait,
            _ => Duration::ZERO,
        }
    }
}

pub fn classify(fault: &Fault, rng: &mut impl Rng) -> Outcome {
    match fault {
        Fault::PeerFlood { .. } | Fault::FloodWait { .. } => Outcome::Retryable {
            kind: FailureKind::Flood,
            wait: Duration::ZERO,
        },
        Fault::PrivacyRestricted { .. } => Outcome::Retryable {
            kind: FailureKind::PrivacyRestricted,
            wait: Duration::ZERO,
        },
        Fault::Unauthorized { .. } => Outcome::Fatal,
        Fault::Other { message } => {
            let wait = match extract_wait_seconds(message) {
                Some(base) => base.saturating_add(rng.gen_range(WAIT_JITTER_SECS)),
                None => 0,
            };
            Outcome::Retryable {
                kind: FailureKind::Unclassified,
                wait: Duration::from_secs(wait),
            }
        }
    }
}

/// First run of ASCII digits in `message`, as seconds.
///
/// A run too large for `u64` saturates rather than being ignored.
pub fn extract_wait_seconds(message: &str) -> Option<u64> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("valid regex"));

    let run = re.find(message)?.as_str();
    Some(run.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    }))
}
