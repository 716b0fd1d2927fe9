//! Append-only audit trail of an invitation run.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use crate::{
    classifier::Outcome,
    domain::{GroupHandle, Member},
    engine::Summary,
    errors::Error,
    Result,
};

const AUDIT_MAX_TEXT: usize = 500;

/// RFC3339 timestamp in UTC.
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl AuditEvent {
    fn base(event: &str, identity: &str, group: &GroupHandle) -> Self {
        Self {
            timestamp: iso_timestamp_utc(),
            event: event.to_string(),
            identity: Some(identity.to_string()),
            group_id: Some(group.id.0),
            group_title: Some(group.title.clone()),
            member_id: None,
            member_name: None,
            outcome: None,
            error: None,
            wait_secs: None,
            errors: None,
            summary: None,
        }
    }

    pub fn invite(identity: &str, group: &GroupHandle, member: &Member, outcome: &Outcome) -> Self {
        let mut ev = Self::base("invite", identity, group);
        ev.member_id = Some(member.id.0);
        ev.member_name = Some(member.name.clone());
        ev.outcome = Some(outcome_label(outcome).to_string());
        let wait = outcome.extra_wait().as_secs();
        if wait > 0 {
            ev.wait_secs = Some(wait);
        }
        ev
    }

    pub fn fault(
        identity: &str,
        group: &GroupHandle,
        member: &Member,
        outcome: &Outcome,
        error: &str,
        errors: u32,
    ) -> Self {
        let mut ev = Self::invite(identity, group, member, outcome);
        ev.event = "fault".to_string();
        ev.wait_secs = Some(outcome.extra_wait().as_secs());
        ev.error = Some(error.to_string());
        ev.errors = Some(errors);
        ev
    }

    pub fn run_end(identity: &str, group: &GroupHandle, summary: &Summary) -> Self {
        let mut ev = Self::base("run_end", identity, group);
        ev.errors = Some(summary.errors);
        ev.summary = Some(summary.clone());
        ev
    }
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Added => "added",
        Outcome::AlreadyPresent => "already_present",
        Outcome::Retryable { kind, .. } => kind.as_str(),
        Outcome::Fatal => "fatal",
    }
}

#[derive(Clone, Debug)]
pub struct AuditLogger {
    path: PathBuf,
    json: bool,
}

impl AuditLogger {
    pub fn new(path: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            path: path.into(),
            json,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, mut event: AuditEvent) -> Result<()> {
        if let Some(s) = &event.member_name {
            event.member_name = Some(truncate_text(s, AUDIT_MAX_TEXT));
        }
        if let Some(s) = &event.error {
            event.error = Some(truncate_text(s, AUDIT_MAX_TEXT));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if self.json {
            let line = serde_json::to_string(&event)?;
            writeln!(file, "{line}")?;
            return Ok(());
        }

        // Plain text format for readability.
        let mut out = String::new();
        out.push('\n');
        out.push_str(&"=".repeat(60));

        let value = serde_json::to_value(&event)?;
        let Some(obj) = value.as_object() else {
            return Err(Error::External(
                "audit event is not a JSON object".to_string(),
            ));
        };
        for (k, v) in obj {
            out.push('\n');
            out.push_str(k);
            out.push_str(": ");
            out.push_str(&json_value_to_display(v));
        }
        out.push('\n');

        file.write_all(out.as_bytes())?;
        Ok(())
    }

    /// Write and log failures; the run must not stop over a full disk.
    pub fn record(&self, event: AuditEvent) {
        if let Err(e) = self.write(event) {
            tracing::warn!(path = %self.path.display(), "audit write failed: {e}");
        }
    }
}

pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}

fn json_value_to_display(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| "<unprintable>".to_string()),
    }
}
