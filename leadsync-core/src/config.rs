//! Environment-sourced settings.
//!
//! [`Settings::from_env`] reads the process environment; [`Settings::from_lookup`]
//! takes any lookup function so validation can be exercised without touching
//! global state. Validation reports every missing variable at once.

use std::time::Duration;

use crate::error::ConfigError;
use crate::policy::StatusPolicy;
use crate::types::ListId;

pub const DEFAULT_TABLE_NAME: &str = "Leads";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

const AIRTABLE_API_KEY: &str = "AIRTABLE_API_KEY";
const AIRTABLE_BASE_ID: &str = "AIRTABLE_BASE_ID";
const AIRTABLE_TABLE_NAME: &str = "AIRTABLE_TABLE_NAME";
const TRELLO_API_KEY: &str = "TRELLO_API_KEY";
const TRELLO_TOKEN: &str = "TRELLO_TOKEN";
const TRELLO_BOARD_ID: &str = "TRELLO_BOARD_ID";
const TRELLO_LIST_TODO_ID: &str = "TRELLO_LIST_TODO_ID";
const TRELLO_LIST_DONE_ID: &str = "TRELLO_LIST_DONE_ID";
const SYNC_INTERVAL_SECONDS: &str = "SYNC_INTERVAL_SECONDS";

/// Required variables, in the order they are reported when missing.
pub const REQUIRED_VARS: [&str; 7] = [
    AIRTABLE_API_KEY,
    AIRTABLE_BASE_ID,
    TRELLO_API_KEY,
    TRELLO_TOKEN,
    TRELLO_BOARD_ID,
    TRELLO_LIST_TODO_ID,
    TRELLO_LIST_DONE_ID,
];

/// Credentials and location of the lead table.
#[derive(Clone, PartialEq, Eq)]
pub struct AirtableSettings {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
}

/// Credentials and location of the task board.
#[derive(Clone, PartialEq, Eq)]
pub struct TrelloSettings {
    pub api_key: String,
    pub token: String,
    pub board_id: String,
    pub todo_list: ListId,
    pub done_list: ListId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub airtable: AirtableSettings,
    pub trello: TrelloSettings,
    pub sync_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let sync_interval = match get(SYNC_INTERVAL_SECONDS) {
            None => Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: SYNC_INTERVAL_SECONDS,
                        value: raw,
                        reason: "expected a positive whole number of seconds",
                    })
                }
            },
        };

        // Presence was checked above; `unwrap_or_default` only satisfies the types.
        let required = |name: &str| get(name).unwrap_or_default();

        Ok(Self {
            airtable: AirtableSettings {
                api_key: required(AIRTABLE_API_KEY),
                base_id: required(AIRTABLE_BASE_ID),
                table_name: get(AIRTABLE_TABLE_NAME)
                    .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            },
            trello: TrelloSettings {
                api_key: required(TRELLO_API_KEY),
                token: required(TRELLO_TOKEN),
                board_id: required(TRELLO_BOARD_ID),
                todo_list: ListId::from(required(TRELLO_LIST_TODO_ID)),
                done_list: ListId::from(required(TRELLO_LIST_DONE_ID)),
            },
            sync_interval,
        })
    }

    pub fn policy(&self) -> StatusPolicy {
        StatusPolicy::new(self.trello.todo_list.clone(), self.trello.done_list.clone())
    }
}

// Credentials never reach the logs.
impl std::fmt::Debug for AirtableSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableSettings")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl std::fmt::Debug for TrelloSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloSettings")
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .field("board_id", &self.board_id)
            .field("todo_list", &self.todo_list)
            .field("done_list", &self.done_list)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full_env() -> HashMap<&'static str, String> {
        REQUIRED_VARS
            .iter()
            .map(|name| (*name, format!("{}-value", name.to_lowercase())))
            .collect()
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Settings, ConfigError> {
        Settings::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_vars_unset() {
        let settings = load(&full_env()).expect("settings");
        assert_eq!(settings.airtable.table_name, "Leads");
        assert_eq!(settings.sync_interval, Duration::from_secs(30));
        assert_eq!(settings.trello.done_list, ListId::from("trello_list_done_id-value"));
    }

    #[test]
    fn every_missing_variable_is_reported() {
        let mut env = full_env();
        env.remove(AIRTABLE_API_KEY);
        env.insert(TRELLO_LIST_DONE_ID, "   ".to_string());

        let err = load(&env).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing(vec![AIRTABLE_API_KEY, TRELLO_LIST_DONE_ID])
        );
        let msg = err.to_string();
        assert!(msg.contains("AIRTABLE_API_KEY"), "got: {msg}");
        assert!(msg.contains("TRELLO_LIST_DONE_ID"), "got: {msg}");
    }

    #[test]
    fn nothing_set_reports_all_seven() {
        let err = load(&HashMap::new()).unwrap_err();
        match err {
            ConfigError::Missing(names) => assert_eq!(names, REQUIRED_VARS.to_vec()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn interval_override_is_parsed() {
        let mut env = full_env();
        env.insert(SYNC_INTERVAL_SECONDS, "120".to_string());
        env.insert(AIRTABLE_TABLE_NAME, "Prospects".to_string());
        let settings = load(&env).expect("settings");
        assert_eq!(settings.sync_interval, Duration::from_secs(120));
        assert_eq!(settings.airtable.table_name, "Prospects");
    }

    #[test]
    fn non_numeric_or_zero_interval_is_rejected() {
        for bad in ["soon", "0", "-5"] {
            let mut env = full_env();
            env.insert(SYNC_INTERVAL_SECONDS, bad.to_string());
            let err = load(&env).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: SYNC_INTERVAL_SECONDS, .. }),
                "{bad}: got {err}"
            );
        }
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let settings = load(&full_env()).expect("settings");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("airtable_api_key-value"));
        assert!(!rendered.contains("trello_token-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn policy_uses_configured_lists() {
        let settings = load(&full_env()).expect("settings");
        let policy = settings.policy();
        assert_eq!(policy.todo, settings.trello.todo_list);
        assert_eq!(policy.done, settings.trello.done_list);
    }
}
