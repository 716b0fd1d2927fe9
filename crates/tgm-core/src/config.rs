use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    errors::Error,
    pacing::{CountdownSleeper, PacingPolicy},
    ports::Sleeper,
    Result,
};

/// Typed configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Account. Nothing in this workspace reads these: they are validated here and
    // handed to whichever `PlatformClient` implementation opens the session.
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    pub session_dir: PathBuf,

    // Pacing
    pub wait_between_operation: Duration,
    pub wait_between_chunks: Duration,
    pub users_chunk: usize,
    pub errors_allowed: u32,
    pub countdown_enabled: bool,

    // Group resolution
    pub dialog_limit: usize,

    // Audit
    pub audit_log_path: PathBuf,
    pub audit_log_json: bool,

    // Summaries
    pub summarize_message_limit: usize,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in `load`).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = Lookup { get: &get };

        let api_id = lookup
            .parse::<i32>("TG_API_ID")?
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                Error::Config("TG_API_ID environment variable is required".to_string())
            })?;
        let api_hash = lookup.required("TG_API_HASH")?;
        let phone = lookup.required("TG_PHONE")?;
        let session_dir =
            PathBuf::from(lookup.str("TG_SESSION_DIR").unwrap_or("sessions".to_string()));

        let defaults = PacingPolicy::default();
        let wait_between_operation = lookup
            .parse::<u64>("WAIT_BETWEEN_OPERATION")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.wait_between_operation);
        let wait_between_chunks = lookup
            .parse::<u64>("WAIT_BETWEEN_CHUNKS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.wait_between_chunks);
        let users_chunk = lookup.parse::<usize>("USERS_CHUNK")?.unwrap_or(defaults.chunk_size);
        if users_chunk == 0 {
            return Err(Error::Config("USERS_CHUNK must be greater than 0".to_string()));
        }
        let errors_allowed = lookup
            .parse::<u32>("ERRORS_ALLOWED")?
            .unwrap_or(crate::budget::DEFAULT_ERRORS_ALLOWED);
        if errors_allowed == 0 {
            return Err(Error::Config("ERRORS_ALLOWED must be greater than 0".to_string()));
        }
        let countdown_enabled = lookup.bool("COUNTDOWN_ENABLED").unwrap_or(true);

        let dialog_limit = lookup
            .parse::<usize>("DIALOG_LIMIT")?
            .unwrap_or(crate::groups::DEFAULT_DIALOG_LIMIT);

        let audit_log_path = PathBuf::from(
            lookup
                .str("AUDIT_LOG_PATH")
                .unwrap_or("/tmp/tgm-audit.log".to_string()),
        );
        let audit_log_json = lookup.bool("AUDIT_LOG_JSON").unwrap_or(false);

        let summarize_message_limit = lookup
            .parse::<usize>("SUMMARIZE_MESSAGE_LIMIT")?
            .unwrap_or(crate::summarize::DEFAULT_MESSAGE_LIMIT);
        let openai_api_key = lookup.str("OPENAI_API_KEY").and_then(non_empty);
        let openai_model = lookup
            .str("OPENAI_MODEL")
            .and_then(non_empty)
            .unwrap_or("gpt-4o-mini".to_string());

        Ok(Self {
            api_id,
            api_hash,
            phone,
            session_dir,
            wait_between_operation,
            wait_between_chunks,
            users_chunk,
            errors_allowed,
            countdown_enabled,
            dialog_limit,
            audit_log_path,
            audit_log_json,
            summarize_message_limit,
            openai_api_key,
            openai_model,
        })
    }

    /// Production sleeper; prints the countdown unless `COUNTDOWN_ENABLED` is off.
    pub fn countdown_sleeper(&self) -> CountdownSleeper {
        CountdownSleeper::new(self.countdown_enabled)
    }

    pub fn sleeper(&self) -> Arc<dyn Sleeper> {
        Arc::new(self.countdown_sleeper())
    }

    pub fn pacing(&self) -> PacingPolicy {
        PacingPolicy {
            wait_between_operation: self.wait_between_operation,
            wait_between_chunks: self.wait_between_chunks,
            chunk_size: self.users_chunk,
        }
    }
}

struct Lookup<'a> {
    get: &'a dyn Fn(&str) -> Option<String>,
}

impl Lookup<'_> {
    fn str(&self, key: &str) -> Option<String> {
        (self.get)(key)
    }

    fn required(&self, key: &str) -> Result<String> {
        self.str(key)
            .and_then(non_empty)
            .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
    }

    fn parse<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.str(key).and_then(non_empty) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} has an invalid value: {raw:?}")))
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.str(key).map(|s| {
            matches!(
                s.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }
}

/// Fill unset variables from a `.env` file; the process environment wins.
fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };
    for (key, value) in parse_dotenv(&contents) {
        if env::var_os(&key).is_none() {
            env::set_var(key, value);
        }
    }
}

/// `KEY=value` pairs in file order. Accepts an `export ` prefix and one layer of
/// matching quotes; comments, blank lines and lines without `=` are skipped.
fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
