//! Environment-derived configuration for the tool policy envelope.
//! Each setting follows the same priority chain: read the var, parse it,
//! fall back to a hardcoded default on absence or a malformed value.

use std::env;
use std::time::Duration;

/// Resolved policy knobs for a single process invocation. Built once at
/// startup via [`EnvelopePolicy::from_env`] and threaded down into the tool
/// policy envelope (`replay-sdk`) and the backfill/comparison services
/// (`replay-runtime`).
#[derive(Debug, Clone)]
pub struct EnvelopePolicy {
    pub max_slot_window: u64,
    pub max_event_count: u64,
    pub max_concurrent_jobs: usize,
    pub tool_timeout: Duration,
    pub allowlist: Vec<String>,
    pub denylist: Vec<String>,
    pub default_redactions: Vec<String>,
    pub audit_enabled: bool,
}

const DEFAULT_MAX_SLOT_WINDOW: u64 = 50_000;
const DEFAULT_MAX_EVENT_COUNT: u64 = 200_000;
const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;
const DEFAULT_TOOL_TIMEOUT_MS: u64 = 30_000;

impl Default for EnvelopePolicy {
    fn default() -> Self {
        EnvelopePolicy {
            max_slot_window: DEFAULT_MAX_SLOT_WINDOW,
            max_event_count: DEFAULT_MAX_EVENT_COUNT,
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
            tool_timeout: Duration::from_millis(DEFAULT_TOOL_TIMEOUT_MS),
            allowlist: Vec::new(),
            denylist: Vec::new(),
            default_redactions: Vec::new(),
            audit_enabled: true,
        }
    }
}

impl EnvelopePolicy {
    /// Resolve policy from the process environment, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = EnvelopePolicy::default();
        EnvelopePolicy {
            max_slot_window: env_u64("REPLAY_MAX_SLOT_WINDOW").unwrap_or(defaults.max_slot_window),
            max_event_count: env_u64("REPLAY_MAX_EVENT_COUNT").unwrap_or(defaults.max_event_count),
            max_concurrent_jobs: env_usize("REPLAY_MAX_CONCURRENT_JOBS")
                .unwrap_or(defaults.max_concurrent_jobs),
            tool_timeout: env_u64("REPLAY_TOOL_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.tool_timeout),
            allowlist: env_list("REPLAY_ALLOWLIST"),
            denylist: env_list("REPLAY_DENYLIST"),
            default_redactions: env_list("REPLAY_DEFAULT_REDACTIONS"),
            audit_enabled: env_bool("REPLAY_AUDIT_ENABLED").unwrap_or(defaults.audit_enabled),
        }
    }

    /// `true` if `actor` is denied per the allow/deny precedence in §4.H
    /// step 5: denylist wins outright; a non-empty allowlist excludes
    /// everyone not on it.
    pub fn actor_is_denied(&self, actor: &str) -> bool {
        if self.denylist.iter().any(|d| d == actor) {
            return true;
        }
        if !self.allowlist.is_empty() && !self.allowlist.iter().any(|a| a == actor) {
            return true;
        }
        false
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_usize(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

fn env_list(name: &str) -> Vec<String> {
    env::var(name)
        .ok()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_empty_allow_and_deny_lists() {
        let p = EnvelopePolicy::default();
        assert!(p.allowlist.is_empty());
        assert!(p.denylist.is_empty());
        assert!(!p.actor_is_denied("anyone"));
    }

    #[test]
    fn denylist_wins_over_allowlist() {
        let mut p = EnvelopePolicy::default();
        p.allowlist = vec!["alice".into(), "bob".into()];
        p.denylist = vec!["bob".into()];
        assert!(!p.actor_is_denied("alice"));
        assert!(p.actor_is_denied("bob"));
    }

    #[test]
    fn nonempty_allowlist_excludes_everyone_else() {
        let mut p = EnvelopePolicy::default();
        p.allowlist = vec!["alice".into()];
        assert!(p.actor_is_denied("mallory"));
        assert!(!p.actor_is_denied("alice"));
    }

    #[test]
    fn env_list_trims_and_drops_empties() {
        std::env::set_var("REPLAY_TEST_LIST_TRIM", " a, b ,,c");
        assert_eq!(env_list("REPLAY_TEST_LIST_TRIM"), vec!["a", "b", "c"]);
        std::env::remove_var("REPLAY_TEST_LIST_TRIM");
    }
}
