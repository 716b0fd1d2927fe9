//! Batch invitation engine.
//!
//! Drives a member list through paced, single-attempt invites against one
//! destination group. Strictly sequential: one remote call in flight, and the
//! whole run suspends during pauses.

use std::{collections::VecDeque, sync::Arc};

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::{
    audit::{AuditEvent, AuditLogger},
    budget::ErrorBudget,
    classifier::{classify, FailureKind, Outcome},
    domain::{GroupHandle, Member},
    errors::{Error, Fault},
    pacing::RateGovernor,
    ports::PlatformClient,
    Result,
};

/// Accounting of one run. Always returned, aborted or not.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub processed: usize,
    pub added: usize,
    pub already_present: usize,
    pub skipped: usize,
    pub errors: u32,
    pub aborted: bool,
}

/// Where a member ends up after its single attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberState {
    Added,
    AlreadyPresent,
    Skipped,
    RunAborted,
}

/// Mutable state of one run, owned by `InvitationEngine::run`.
struct RunState {
    remaining: VecDeque<Member>,
    processed: usize,
    added: usize,
    already_present: usize,
    skipped: usize,
    budget: ErrorBudget,
    chunk_position: usize,
}

impl RunState {
    fn new(members: Vec<Member>, errors_allowed: u32) -> Self {
        Self {
            remaining: members.into(),
            processed: 0,
            added: 0,
            already_present: 0,
            skipped: 0,
            budget: ErrorBudget::new(errors_allowed),
            chunk_position: 0,
        }
    }

    fn apply(&mut self, outcome: &Outcome) -> MemberState {
        self.processed += 1;
        match outcome {
            Outcome::Added => {
                self.added += 1;
                MemberState::Added
            }
            Outcome::AlreadyPresent => {
                self.already_present += 1;
                MemberState::AlreadyPresent
            }
            Outcome::Retryable { .. } => {
                self.skipped += 1;
                self.budget.record_error();
                if self.budget.should_abort() {
                    MemberState::RunAborted
                } else {
                    MemberState::Skipped
                }
            }
            Outcome::Fatal => {
                self.skipped += 1;
                self.budget.record_error();
                MemberState::RunAborted
            }
        }
    }

    fn summary(&self, aborted: bool) -> Summary {
        Summary {
            processed: self.processed,
            added: self.added,
            already_present: self.already_present,
            skipped: self.skipped,
            errors: self.budget.errors(),
            aborted,
        }
    }
}

pub struct InvitationEngine {
    client: Arc<dyn PlatformClient>,
    governor: RateGovernor,
    errors_allowed: u32,
    audit: Option<AuditLogger>,
    jitter_seed: Option<u64>,
}

impl InvitationEngine {
    pub fn new(
        client: Arc<dyn PlatformClient>,
        governor: RateGovernor,
        errors_allowed: u32,
    ) -> Self {
        Self {
            client,
            governor,
            errors_allowed,
            audit: None,
            jitter_seed: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Deterministic jitter (tests, replays).
    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    /// Invite `members` into `destination`, in order, one attempt each.
    pub async fn run(&self, destination: &GroupHandle, members: Vec<Member>) -> Result<Summary> {
        if members.is_empty() {
            return Err(Error::InvalidInput(
                "cannot run an invitation batch with no members".to_string(),
            ));
        }

        let identity = self.client.identity();
        let mut rng = match self.jitter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut state = RunState::new(members, self.errors_allowed);
        let mut aborted = false;

        tracing::info!(
            group = %destination.title,
            members = state.remaining.len(),
            "{} users to add in total",
            state.remaining.len()
        );

        while let Some(member) = state.remaining.pop_front() {
            if self.governor.is_chunk_boundary(state.processed) {
                state.chunk_position += 1;
                self.governor.chunk_pause().await;
            }

            tracing::info!(member_id = member.id.0, name = %member.name, "adding member");
            let (outcome, fault) = match self.client.invite_user(destination, &member).await {
                Ok(updates) if !updates.is_empty() => {
                    tracing::info!(
                        member_id = member.id.0,
                        updates = %updates.kinds(),
                        "user {} added",
                        member.name
                    );
                    (Outcome::Added, None)
                }
                Ok(_) => {
                    tracing::info!(
                        member_id = member.id.0,
                        "user {} was already in the group",
                        member.name
                    );
                    (Outcome::AlreadyPresent, None)
                }
                Err(fault) => {
                    let outcome = classify(&fault, &mut rng);
                    self.log_fault(&identity, destination, &member, &fault, &outcome, &state);
                    (outcome, Some(fault))
                }
            };

            let member_state = state.apply(&outcome);
            if let Some(audit) = &self.audit {
                audit.record(AuditEvent::invite(&identity, destination, &member, &outcome));
                if let Some(fault) = &fault {
                    audit.record(AuditEvent::fault(
                        &identity,
                        destination,
                        &member,
                        &outcome,
                        &fault.to_string(),
                        state.budget.errors(),
                    ));
                }
            }

            if outcome == Outcome::Fatal {
                tracing::error!(identity = %identity, "session is no longer usable, stopping run");
                aborted = true;
                break;
            }

            self.governor.operation_pause().await;
            self.governor.pause(outcome.extra_wait()).await;

            if member_state == MemberState::RunAborted {
                tracing::error!(
                    errors = state.budget.errors(),
                    "{} number of errors reached, stopping run",
                    state.budget.allowed()
                );
                aborted = true;
                break;
            }
        }

        let summary = state.summary(aborted);
        tracing::info!(
            added = summary.added,
            already_present = summary.already_present,
            skipped = summary.skipped,
            aborted = summary.aborted,
            chunks = state.chunk_position + 1,
            "total members added: {}",
            summary.added
        );
        if let Some(audit) = &self.audit {
            audit.record(AuditEvent::run_end(&identity, destination, &summary));
        }
        Ok(summary)
    }

    fn log_fault(
        &self,
        identity: &str,
        destination: &GroupHandle,
        member: &Member,
        fault: &Fault,
        outcome: &Outcome,
        state: &RunState,
    ) {
        let errors = state.budget.errors() + 1;
        match outcome {
            Outcome::Retryable {
                kind: FailureKind::Flood,
                ..
            } => tracing::warn!(
                identity = %identity,
                member_id = member.id.0,
                errors,
                "flood error from platform operating with {identity}: {fault}"
            ),
            Outcome::Retryable {
                kind: FailureKind::PrivacyRestricted,
                ..
            } => tracing::warn!(
                member_id = member.id.0,
                errors,
                "user privacy settings do not allow this, skipping: {fault}"
            ),
            Outcome::Retryable { wait, .. } => tracing::warn!(
                member_id = member.id.0,
                group = %destination.title,
                errors,
                wait_secs = wait.as_secs(),
                "unexpected error: {fault}"
            ),
            Outcome::Fatal => tracing::error!(
                identity = %identity,
                member_id = member.id.0,
                "fatal platform error: {fault}"
            ),
            Outcome::Added | Outcome::AlreadyPresent => {}
        }
    }
}
