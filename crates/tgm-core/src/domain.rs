use serde::Serialize;

/// Platform user id (numeric).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(pub i64);

/// Platform group/channel id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GroupId(pub i64);

/// Opaque per-peer credential issued by the platform (`access_hash`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AccessHash(pub i64);

/// A member read from a source group or a stored member list.
///
/// Identity is the user id; the rest is carried for the invite call and logs.
#[derive(Clone, Debug, Serialize)]
pub struct Member {
    pub id: UserId,
    pub access_hash: AccessHash,
    pub name: String,
    pub username: Option<String>,
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Member {}

impl Member {
    pub fn from_participant(user: &PlatformUser) -> Self {
        let first = user.first_name.as_deref().unwrap_or("");
        let last = user.last_name.as_deref().unwrap_or("");
        Self {
            id: user.id,
            access_hash: user.access_hash,
            name: format!("{first} {last}").trim().to_string(),
            username: user.username.clone().filter(|u| !u.is_empty()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GroupKind {
    Channel,
    Chat,
}

/// A resolved, addressable group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupHandle {
    pub id: GroupId,
    pub access_hash: AccessHash,
    pub title: String,
    pub kind: GroupKind,
    pub megagroup: bool,
}

/// Which groups a listing should keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupFilter {
    /// Supergroups only.
    Megagroup,
    /// Everything that is not a supergroup (basic chats, broadcast channels).
    Basic,
    Any,
}

impl GroupFilter {
    pub fn matches(self, group: &GroupHandle) -> bool {
        match self {
            GroupFilter::Megagroup => group.megagroup,
            GroupFilter::Basic => !group.megagroup,
            GroupFilter::Any => true,
        }
    }
}

/// One entry of the dialog list as reported by the platform.
#[derive(Clone, Debug)]
pub enum DialogChat {
    Group {
        handle: GroupHandle,
        deactivated: bool,
    },
    /// Forbidden/left chats and anything else that cannot be addressed.
    Unsupported { id: i64 },
}

/// A participant as returned by the platform.
#[derive(Clone, Debug, Default)]
pub struct PlatformUser {
    pub id: UserId,
    pub access_hash: AccessHash,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PlatformMessage {
    pub text: Option<String>,
}

/// A single update returned by a successful invite call.
#[derive(Clone, Debug)]
pub struct Update {
    pub kind: String,
}

/// The platform's answer to an invite: empty means nothing changed.
#[derive(Clone, Debug, Default)]
pub struct UpdateList {
    pub updates: Vec<Update>,
}

impl UpdateList {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Comma-separated update kinds, for logs.
    pub fn kinds(&self) -> String {
        self.updates
            .iter()
            .map(|u| u.kind.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> PlatformUser {
        PlatformUser {
            id: UserId(7),
            access_hash: AccessHash(99),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            username: Some(String::new()),
        }
    }

    #[test]
    fn member_name_joins_and_trims() {
        let full = Member::from_participant(&user(Some("Ada"), Some("Lovelace")));
        assert_eq!(full.name, "Ada Lovelace");
        assert_eq!(Member::from_participant(&user(Some("Ada"), None)).name, "Ada");
        assert_eq!(Member::from_participant(&user(None, Some("L"))).name, "L");
        assert_eq!(Member::from_participant(&user(None, None)).name, "");
    }

    #[test]
    fn empty_username_becomes_none() {
        let m = Member::from_participant(&user(None, None));
        assert_eq!(m.username, None);
        assert_eq!(m.id, UserId(7));
        assert_eq!(m.access_hash, AccessHash(99));
    }

    #[test]
    fn update_kinds_are_joined() {
        let list = UpdateList {
            updates: vec![
                Update {
                    kind: "updateNewChannelMessage".to_string(),
                },
                Update {
                    kind: "updateChannel".to_string(),
                },
            ],
        };
        assert!(!list.is_empty());
        assert_eq!(list.kinds(), "updateNewChannelMessage,updateChannel");
        assert_eq!(UpdateList::default().kinds(), "");
    }

    #[test]
    fn filter_matches_megagroup_flag() {
        let mut g = GroupHandle {
            id: GroupId(1),
            access_hash: AccessHash(2),
            title: "t".to_string(),
            kind: GroupKind::Channel,
            megagroup: true,
        };
        assert!(GroupFilter::Megagroup.matches(&g));
        assert!(!GroupFilter::Basic.matches(&g));
        assert!(GroupFilter::Any.matches(&g));
        g.megagroup = false;
        assert!(!GroupFilter::Megagroup.matches(&g));
        assert!(GroupFilter::Basic.matches(&g));
    }
}
