use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{DialogChat, GroupHandle, Member, PlatformMessage, PlatformUser, UpdateList},
    errors::Fault,
    Result,
};

pub type FaultResult<T> = std::result::Result<T, Fault>;

/// Hexagonal port for the remote messaging platform.
///
/// One implementation wraps one authenticated session; the core never talks to
/// more than one at a time. Every call is a single outbound RPC.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Who is driving the calls (api id / phone). Only used for logs.
    fn identity(&self) -> String;

    async fn invite_user(&self, group: &GroupHandle, member: &Member) -> FaultResult<UpdateList>;

    /// Dialog list, first page only.
    async fn list_dialogs(&self, limit: usize) -> FaultResult<Vec<DialogChat>>;

    async fn create_channel(
        &self,
        title: &str,
        about: &str,
        megagroup: bool,
    ) -> FaultResult<GroupHandle>;

    async fn get_participants(
        &self,
        group: &GroupHandle,
        aggressive: bool,
    ) -> FaultResult<Vec<PlatformUser>>;

    async fn migrate_chat_to_supergroup(&self, group: &GroupHandle) -> FaultResult<GroupHandle>;

    /// Re-resolve a handle into the entity the platform wants for writes.
    async fn resolve_group(&self, group: &GroupHandle) -> FaultResult<GroupHandle>;

    /// Most recent `limit` messages, oldest first.
    async fn recent_messages(
        &self,
        group: &GroupHandle,
        limit: usize,
    ) -> FaultResult<Vec<PlatformMessage>>;
}

/// Picks one group among candidates.
///
/// Production wiring asks a human; tests answer deterministically.
#[async_trait]
pub trait GroupSelector: Send + Sync {
    /// Returns the chosen index, or `None` when the choice was cancelled.
    async fn select(&self, prompt: &str, candidates: &[GroupHandle]) -> Result<Option<usize>>;
}

/// Suspends the run. Injected so tests do not wait.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Third-party text summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String>;
}
