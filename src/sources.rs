//! Source selection: app-to-schema exclusion mapping (spec §4.6).
//!
//! Available sources are the configured `schemaSources` minus the schemas of
//! any excluded app. The agent-mode dispatcher inverts this: it is handed an
//! allow-list of apps rather than an exclusion list, so [`schemas_for_apps`]
//! does the forward lookup instead.

/// An application/corpus identifier as it appears in query filters and the
/// source-exclusion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum App {
    Slack,
    Gmail,
    GoogleDrive,
    GoogleCalendar,
    GoogleWorkspace,
}

impl App {
    /// The schema names excluded from the available source set when this
    /// app is excluded from connectivity.
    #[must_use]
    pub const fn excluded_schemas(self) -> &'static [&'static str] {
        match self {
            Self::Slack => &["chat_message", "chat_user"],
            Self::Gmail => &["mail", "mail_attachment"],
            Self::GoogleDrive => &["file"],
            Self::GoogleCalendar => &["event"],
            Self::GoogleWorkspace => &["user"],
        }
    }

    /// The schema names this app owns, used by the agent-mode forward lookup.
    #[must_use]
    pub const fn schemas(self) -> &'static [&'static str] {
        self.excluded_schemas()
    }
}

/// Compute the available source list: every configured schema minus the
/// schemas belonging to any app in `excluded_apps`.
#[must_use]
pub fn available_sources(configured: &[String], excluded_apps: &[App]) -> Vec<String> {
    let excluded: Vec<&str> = excluded_apps
        .iter()
        .flat_map(|app| app.excluded_schemas().iter().copied())
        .collect();
    configured
        .iter()
        .filter(|schema| !excluded.contains(&schema.as_str()))
        .cloned()
        .collect()
}

/// Agent-mode forward lookup: the union of schemas owned by every app in the
/// allow-list, in allow-list order, deduplicated.
#[must_use]
pub fn schemas_for_apps(allowed_apps: &[App]) -> Vec<String> {
    let mut out = Vec::new();
    for app in allowed_apps {
        for schema in app.schemas() {
            if !out.contains(&(*schema).to_owned()) {
                out.push((*schema).to_owned());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Vec<String> {
        vec![
            "file".into(),
            "mail".into(),
            "mail_attachment".into(),
            "event".into(),
            "chat_message".into(),
            "chat_user".into(),
            "user".into(),
        ]
    }

    #[test]
    fn excluding_gmail_drops_its_two_schemas() {
        let sources = available_sources(&configured(), &[App::Gmail]);
        assert!(!sources.contains(&"mail".to_owned()));
        assert!(!sources.contains(&"mail_attachment".to_owned()));
        assert!(sources.contains(&"file".to_owned()));
    }

    #[test]
    fn excluding_multiple_apps_unions_exclusions() {
        let sources = available_sources(&configured(), &[App::Slack, App::GoogleCalendar]);
        assert!(!sources.contains(&"chat_message".to_owned()));
        assert!(!sources.contains(&"chat_user".to_owned()));
        assert!(!sources.contains(&"event".to_owned()));
        assert!(sources.contains(&"file".to_owned()));
        assert!(sources.contains(&"user".to_owned()));
    }

    #[test]
    fn no_exclusions_returns_everything() {
        let sources = available_sources(&configured(), &[]);
        assert_eq!(sources.len(), configured().len());
    }

    #[test]
    fn agent_mode_allow_list_inverts_to_schema_union() {
        let schemas = schemas_for_apps(&[App::Gmail, App::GoogleDrive]);
        assert_eq!(schemas, vec!["mail", "mail_attachment", "file"]);
    }

    #[test]
    fn agent_mode_dedupes_across_apps() {
        // Slack and Gmail share no schemas, but calling schemas_for_apps with
        // overlapping allow-lists elsewhere must still not duplicate.
        let schemas = schemas_for_apps(&[App::Slack, App::Slack]);
        assert_eq!(schemas, vec!["chat_message", "chat_user"]);
    }
}
