//! In-process fakes for the ports.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    domain::{
        AccessHash, DialogChat, GroupHandle, GroupId, GroupKind, Member, PlatformMessage,
        PlatformUser, Update, UpdateList, UserId,
    },
    errors::Fault,
    ports::{FaultResult, GroupSelector, PlatformClient, Sleeper, Summarizer},
    Result,
};

pub fn group(id: i64, title: &str, megagroup: bool) -> GroupHandle {
    GroupHandle {
        id: GroupId(id),
        access_hash: AccessHash(id * 100),
        title: title.to_string(),
        kind: GroupKind::Channel,
        megagroup,
    }
}

pub fn member(id: i64) -> Member {
    Member {
        id: UserId(id),
        access_hash: AccessHash(id + 1_000),
        name: format!("user {id}"),
        username: None,
    }
}

pub fn members(n: usize) -> Vec<Member> {
    (1..=n as i64).map(member).collect()
}

pub fn participant(id: i64, first: &str, last: &str) -> PlatformUser {
    PlatformUser {
        id: UserId(id),
        access_hash: AccessHash(id + 1_000),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        username: None,
    }
}

pub fn tmp_file(prefix: &str) -> PathBuf {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_nanos();
    let pid = std::process::id();
    std::env::temp_dir().join(format!("{prefix}-{pid}-{ts}.log"))
}

#[derive(Default)]
struct PlatformState {
    dialogs: Vec<DialogChat>,
    participants: HashMap<i64, Vec<PlatformUser>>,
    invite_results: HashMap<i64, FaultResult<UpdateList>>,
    messages: HashMap<i64, Vec<PlatformMessage>>,
    next_channel_id: i64,

    invited: Vec<(i64, i64)>,
    created: Vec<(String, String, bool)>,
    migrated: Vec<i64>,
    resolved: Vec<i64>,
    dialog_limits: Vec<usize>,
}

/// Scripted platform. Invites succeed with one update unless scripted otherwise.
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    pub fn with_group(self, handle: GroupHandle) -> Self {
        self.state.lock().unwrap().dialogs.push(DialogChat::Group {
            handle,
            deactivated: false,
        });
        self
    }

    pub fn with_dialog(self, dialog: DialogChat) -> Self {
        self.state.lock().unwrap().dialogs.push(dialog);
        self
    }

    pub fn with_participants(self, group_id: i64, users: Vec<PlatformUser>) -> Self {
        self.state
            .lock()
            .unwrap()
            .participants
            .insert(group_id, users);
        self
    }

    pub fn with_messages(self, group_id: i64, messages: Vec<PlatformMessage>) -> Self {
        self.state.lock().unwrap().messages.insert(group_id, messages);
        self
    }

    pub fn invite_result(&self, user_id: i64, result: FaultResult<UpdateList>) {
        self.state
            .lock()
            .unwrap()
            .invite_results
            .insert(user_id, result);
    }

    pub fn already_member(&self, user_id: i64) {
        self.invite_result(user_id, Ok(UpdateList::default()));
    }

    pub fn fail_invite(&self, user_id: i64, fault: Fault) {
        self.invite_result(user_id, Err(fault));
    }

    /// `(group id, user id)` of every invite call, in order.
    pub fn invited(&self) -> Vec<(i64, i64)> {
        self.state.lock().unwrap().invited.clone()
    }

    pub fn invited_users(&self) -> Vec<i64> {
        self.invited().into_iter().map(|(_, u)| u).collect()
    }

    pub fn created(&self) -> Vec<(String, String, bool)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn migrated(&self) -> Vec<i64> {
        self.state.lock().unwrap().migrated.clone()
    }

    pub fn resolved(&self) -> Vec<i64> {
        self.state.lock().unwrap().resolved.clone()
    }

    pub fn dialog_limits(&self) -> Vec<usize> {
        self.state.lock().unwrap().dialog_limits.clone()
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    fn identity(&self) -> String {
        "api_id:1 (+100)".to_string()
    }

    async fn invite_user(&self, group: &GroupHandle, member: &Member) -> FaultResult<UpdateList> {
        let mut st = self.state.lock().unwrap();
        st.invited.push((group.id.0, member.id.0));
        st.invite_results
            .get(&member.id.0)
            .cloned()
            .unwrap_or_else(|| {
                Ok(UpdateList {
                    updates: vec![Update {
                        kind: "updateChannel".to_string(),
                    }],
                })
            })
    }

    async fn list_dialogs(&self, limit: usize) -> FaultResult<Vec<DialogChat>> {
        let mut st = self.state.lock().unwrap();
        st.dialog_limits.push(limit);
        Ok(st.dialogs.iter().take(limit).cloned().collect())
    }

    async fn create_channel(
        &self,
        title: &str,
        about: &str,
        megagroup: bool,
    ) -> FaultResult<GroupHandle> {
        let mut st = self.state.lock().unwrap();
        st.next_channel_id += 1;
        let handle = group(9_000 + st.next_channel_id, title, megagroup);
        st.created
            .push((title.to_string(), about.to_string(), megagroup));
        st.dialogs.push(DialogChat::Group {
            handle: handle.clone(),
            deactivated: false,
        });
        Ok(handle)
    }

    async fn get_participants(
        &self,
        group: &GroupHandle,
        _aggressive: bool,
    ) -> FaultResult<Vec<PlatformUser>> {
        let st = self.state.lock().unwrap();
        Ok(st.participants.get(&group.id.0).cloned().unwrap_or_default())
    }

    async fn migrate_chat_to_supergroup(&self, group: &GroupHandle) -> FaultResult<GroupHandle> {
        let mut st = self.state.lock().unwrap();
        st.migrated.push(group.id.0);
        let mut migrated = group.clone();
        migrated.megagroup = true;
        migrated.kind = GroupKind::Channel;
        Ok(migrated)
    }

    async fn resolve_group(&self, group: &GroupHandle) -> FaultResult<GroupHandle> {
        self.state.lock().unwrap().resolved.push(group.id.0);
        Ok(group.clone())
    }

    async fn recent_messages(
        &self,
        group: &GroupHandle,
        limit: usize,
    ) -> FaultResult<Vec<PlatformMessage>> {
        let st = self.state.lock().unwrap();
        let all = st.messages.get(&group.id.0).cloned().unwrap_or_default();
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }

    pub fn count_of(&self, d: Duration) -> usize {
        self.recorded().into_iter().filter(|p| *p == d).count()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Always answers with the same index (or cancels with `None`).
pub struct FixedSelector {
    pub choice: Option<usize>,
    prompts: Mutex<Vec<(String, Vec<String>)>>,
}

impl FixedSelector {
    pub fn new(choice: Option<usize>) -> Self {
        Self {
            choice,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Titles offered on each call.
    pub fn offered(&self) -> Vec<Vec<String>> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, titles)| titles.clone())
            .collect()
    }
}

#[async_trait]
impl GroupSelector for FixedSelector {
    async fn select(&self, prompt: &str, candidates: &[GroupHandle]) -> Result<Option<usize>> {
        self.prompts.lock().unwrap().push((
            prompt.to_string(),
            candidates.iter().map(|c| c.title.clone()).collect(),
        ));
        Ok(self.choice)
    }
}

#[derive(Default)]
pub struct FakeSummarizer {
    prompts: Mutex<Vec<String>>,
}

impl FakeSummarizer {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("summary of {} chars", prompt.len()))
    }
}
