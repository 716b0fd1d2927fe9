//! Top-level flows: channel migration and adding a stored member list.

use std::sync::Arc;

use crate::{
    audit::AuditLogger,
    config::Config,
    domain::{GroupFilter, GroupHandle, Member},
    engine::{InvitationEngine, Summary},
    groups::GroupDirectory,
    pacing::RateGovernor,
    ports::{GroupSelector, PlatformClient, Sleeper, Summarizer},
    summarize::{summarize_group, DEFAULT_MESSAGE_LIMIT},
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationStatus {
    /// No active channel carries the requested title.
    SourceNotFound,
    /// The source exists but has no participants to move.
    NoMembers,
    Completed,
    Aborted,
}

#[derive(Clone, Debug)]
pub struct MigrationReport {
    pub status: MigrationStatus,
    pub source: Option<GroupHandle>,
    pub destination: Option<GroupHandle>,
    pub summary: Summary,
}

impl MigrationReport {
    fn empty(status: MigrationStatus, source: Option<GroupHandle>) -> Self {
        Self {
            status,
            source,
            destination: None,
            summary: Summary::default(),
        }
    }
}

pub struct Migrator {
    directory: GroupDirectory,
    engine: InvitationEngine,
    summarize_limit: usize,
}

impl Migrator {
    pub fn new(directory: GroupDirectory, engine: InvitationEngine) -> Self {
        Self {
            directory,
            engine,
            summarize_limit: DEFAULT_MESSAGE_LIMIT,
        }
    }

    pub fn with_summarize_limit(mut self, limit: usize) -> Self {
        self.summarize_limit = limit;
        self
    }

    /// Wire the directory and engine for one session from configuration,
    /// pausing with the configured countdown sleeper.
    pub fn from_config(cfg: &Config, client: Arc<dyn PlatformClient>) -> Self {
        Self::from_config_with_sleeper(cfg, client, cfg.sleeper())
    }

    pub fn from_config_with_sleeper(
        cfg: &Config,
        client: Arc<dyn PlatformClient>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let directory = GroupDirectory::new(client.clone()).with_dialog_limit(cfg.dialog_limit);
        let governor = RateGovernor::new(cfg.pacing(), sleeper);
        let engine = InvitationEngine::new(client, governor, cfg.errors_allowed)
            .with_audit(AuditLogger::new(&cfg.audit_log_path, cfg.audit_log_json));
        Self::new(directory, engine).with_summarize_limit(cfg.summarize_message_limit)
    }

    /// Summarize the most recent messages of a group chosen by `selector`.
    pub async fn summarize_group(
        &self,
        selector: &dyn GroupSelector,
        summarizer: &dyn Summarizer,
    ) -> Result<Option<String>> {
        summarize_group(&self.directory, selector, summarizer, self.summarize_limit).await
    }

    pub fn directory(&self) -> &GroupDirectory {
        &self.directory
    }

    /// Move every participant of the channel titled `title` into its supergroup.
    pub async fn migrate_channel(&self, title: &str) -> Result<MigrationReport> {
        let Some(channel) = self.directory.find_by_title(title, GroupFilter::Basic).await? else {
            tracing::info!("no channel found with name {title}");
            return Ok(MigrationReport::empty(MigrationStatus::SourceNotFound, None));
        };

        let supergroup = self.directory.provision_supergroup(&channel).await?;
        let members = self.directory.members_of(&channel).await?;
        if members.is_empty() {
            tracing::info!(channel = %channel.title, "channel has no participants to move");
            return Ok(MigrationReport {
                destination: Some(supergroup),
                ..MigrationReport::empty(MigrationStatus::NoMembers, Some(channel))
            });
        }

        let destination = self.directory.client().resolve_group(&supergroup).await?;
        tracing::info!(
            "{} users to add in total to the channel {}",
            members.len(),
            destination.title
        );
        let summary = self.engine.run(&destination, members).await?;
        let status = if summary.aborted {
            MigrationStatus::Aborted
        } else {
            MigrationStatus::Completed
        };

        Ok(MigrationReport {
            status,
            source: Some(channel),
            destination: Some(destination),
            summary,
        })
    }

    /// Invite a caller-supplied member list into a supergroup chosen by `selector`.
    pub async fn add_members(
        &self,
        members: Vec<Member>,
        selector: &dyn GroupSelector,
    ) -> Result<Option<Summary>> {
        let Some(group) = self
            .directory
            .select_group(GroupFilter::Megagroup, selector)
            .await?
        else {
            return Ok(None);
        };
        let destination = self.directory.client().resolve_group(&group).await?;
        let summary = self.engine.run(&destination, members).await?;
        Ok(Some(summary))
    }
}
