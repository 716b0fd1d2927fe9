//! Group resolution and supergroup provisioning.

use std::sync::Arc;

use crate::{
    domain::{DialogChat, GroupFilter, GroupHandle, Member},
    ports::{GroupSelector, PlatformClient},
    Result,
};

/// Dialogs fetched per listing. No pagination beyond the first page.
pub const DEFAULT_DIALOG_LIMIT: usize = 200;

/// Suffix appended to a source channel title to name its supergroup.
pub const SUPERGROUP_SUFFIX: &str = "_group";

pub const SUPERGROUP_ABOUT: &str = "about";

pub fn supergroup_title(source_title: &str) -> String {
    format!("{source_title}{SUPERGROUP_SUFFIX}")
}

#[derive(Clone)]
pub struct GroupDirectory {
    client: Arc<dyn PlatformClient>,
    dialog_limit: usize,
}

impl GroupDirectory {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self {
            client,
            dialog_limit: DEFAULT_DIALOG_LIMIT,
        }
    }

    pub fn with_dialog_limit(mut self, limit: usize) -> Self {
        self.dialog_limit = limit;
        self
    }

    pub fn client(&self) -> &Arc<dyn PlatformClient> {
        &self.client
    }

    /// Active groups from the dialog list, in dialog order.
    pub async fn list_groups(&self, filter: GroupFilter) -> Result<Vec<GroupHandle>> {
        let dialogs = self.client.list_dialogs(self.dialog_limit).await?;
        let groups = dialogs
            .into_iter()
            .filter_map(|d| match d {
                DialogChat::Group {
                    handle,
                    deactivated: false,
                } => Some(handle),
                DialogChat::Group {
                    handle,
                    deactivated: true,
                } => {
                    tracing::debug!(group = %handle.title, "skipping deactivated group");
                    None
                }
                DialogChat::Unsupported { id } => {
                    tracing::debug!(id, "skipping unsupported dialog");
                    None
                }
            })
            .filter(|g| filter.matches(g))
            .collect();
        Ok(groups)
    }

    /// First exact title match.
    pub async fn find_by_title(
        &self,
        title: &str,
        filter: GroupFilter,
    ) -> Result<Option<GroupHandle>> {
        Ok(self
            .list_groups(filter)
            .await?
            .into_iter()
            .find(|g| g.title == title))
    }

    /// Find or create the supergroup paired with `source`.
    ///
    /// Only as unique as the dialog list: two concurrent runs can both create one.
    pub async fn provision_supergroup(&self, source: &GroupHandle) -> Result<GroupHandle> {
        let title = supergroup_title(&source.title);
        if let Some(existing) = self.find_by_title(&title, GroupFilter::Megagroup).await? {
            tracing::info!(group = %existing.title, "reusing existing supergroup");
            return Ok(existing);
        }

        let created = self
            .client
            .create_channel(&title, SUPERGROUP_ABOUT, true)
            .await?;
        tracing::info!(group = %created.title, id = created.id.0, "created supergroup");
        Ok(created)
    }

    /// Let `selector` pick one group matching `filter`.
    pub async fn select_group(
        &self,
        filter: GroupFilter,
        selector: &dyn GroupSelector,
    ) -> Result<Option<GroupHandle>> {
        let mut groups = self.list_groups(filter).await?;
        if groups.is_empty() {
            tracing::info!(?filter, "no groups available to choose from");
            return Ok(None);
        }

        let Some(idx) = selector.select("Choose a group: ", &groups).await? else {
            return Ok(None);
        };
        if idx >= groups.len() {
            tracing::warn!(idx, available = groups.len(), "selection out of range");
            return Ok(None);
        }
        Ok(Some(groups.swap_remove(idx)))
    }

    /// Convert a chosen basic group into a supergroup.
    pub async fn set_supergroup(
        &self,
        selector: &dyn GroupSelector,
    ) -> Result<Option<GroupHandle>> {
        let Some(target) = self.select_group(GroupFilter::Basic, selector).await? else {
            return Ok(None);
        };
        tracing::info!(group = %target.title, "migrating chat to supergroup");
        let migrated = self.client.migrate_chat_to_supergroup(&target).await?;
        Ok(Some(migrated))
    }

    /// All current participants of `group` as members.
    pub async fn members_of(&self, group: &GroupHandle) -> Result<Vec<Member>> {
        let participants = self.client.get_participants(group, true).await?;
        Ok(participants.iter().map(Member::from_participant).collect())
    }

    /// Pick a supergroup and fetch its members (persistence is up to the caller).
    pub async fn scrape_members(
        &self,
        selector: &dyn GroupSelector,
    ) -> Result<Option<(GroupHandle, Vec<Member>)>> {
        let Some(group) = self.select_group(GroupFilter::Megagroup, selector).await? else {
            return Ok(None);
        };
        tracing::info!(group = %group.title, "fetching members");
        let members = self.members_of(&group).await?;
        tracing::info!(count = members.len(), "members scraped");
        Ok(Some((group, members)))
    }
}
