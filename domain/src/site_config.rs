//! Site configuration: the OAuth client, allowed sign-in domains and the cloud project
//! the dashboard uploads into.
//!
//! Settings are read from the database on every use so that a save takes effect
//! without a restart. Until the first save, reads return placeholder values that
//! are never written back.

use crate::error::Error;
use crate::site_configs::{Model, SINGLETON_KEY};
use entity_api::site_config;
use log::*;
use sea_orm::ConnectionTrait;

pub const NO_CONFIG_MESSAGE: &str = "No config found. Please create one.";
pub const UPDATED_MESSAGE: &str = "Config updated successfully.";

const BUCKET_SUFFIX: &str = "operation-insights-audio-files";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub allowed_domains: Vec<String>,
    pub project_id: String,
    pub prompt_summary: String,
    pub prompt_action_items: String,
}

impl SiteConfig {
    pub fn placeholder() -> Self {
        Self {
            client_id: "000000000000-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx.apps.googleusercontent.com"
                .to_string(),
            client_secret: "GOCSPX-xxxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string(),
            callback_url: "https://ccinsights-xxxxxxxxxx-xx.x.run.app/auth/google/callback"
                .to_string(),
            allowed_domains: vec!["google.com".to_string(), "YOUR-DOMAIN".to_string()],
            project_id: "YOUR-PROJECT".to_string(),
            prompt_summary: String::new(),
            prompt_action_items: String::new(),
        }
    }

    /// Bucket that holds this project's uploaded audio.
    pub fn bucket_name(&self) -> String {
        format!("{}-{BUCKET_SUFFIX}", self.project_id)
    }

    /// True if the domain of `email` (the text after its last `@`) is allowed to sign in.
    pub fn allows_email(&self, email: &str) -> bool {
        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };
        let domain = domain.trim();
        !domain.is_empty()
            && self
                .allowed_domains
                .iter()
                .any(|allowed| allowed.trim().eq_ignore_ascii_case(domain))
    }
}

impl From<Model> for SiteConfig {
    fn from(model: Model) -> Self {
        Self {
            client_id: model.client_id,
            client_secret: model.client_secret,
            callback_url: model.callback_url,
            allowed_domains: model.allowed_domains,
            project_id: model.project_id,
            prompt_summary: model.prompt_summary,
            prompt_action_items: model.prompt_action_items,
        }
    }
}

/// Splits a comma separated domain list, dropping blanks.
pub fn parse_domains(domains: &str) -> Vec<String> {
    domains
        .split(',')
        .map(str::trim)
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
        .collect()
}

/// The configuration in effect right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Current {
    pub config: SiteConfig,
    /// Set when nothing has been saved yet and `config` holds placeholders.
    pub is_placeholder: bool,
}

impl Current {
    /// Notice to show alongside the settings, if any.
    pub fn message(&self) -> Option<&'static str> {
        self.is_placeholder.then_some(NO_CONFIG_MESSAGE)
    }
}

pub async fn find_or_placeholder(db: &impl ConnectionTrait) -> Result<Current, Error> {
    match site_config::find(db).await? {
        Some(model) => Ok(Current {
            config: model.into(),
            is_placeholder: false,
        }),
        None => {
            info!("No site configuration saved yet, using placeholders");
            Ok(Current {
                config: SiteConfig::placeholder(),
                is_placeholder: true,
            })
        }
    }
}

/// Replaces the whole configuration.
pub async fn replace(db: &impl ConnectionTrait, config: SiteConfig) -> Result<SiteConfig, Error> {
    let model = Model {
        key: SINGLETON_KEY.to_string(),
        client_id: config.client_id.trim().to_string(),
        client_secret: config.client_secret.trim().to_string(),
        callback_url: config.callback_url.trim().to_string(),
        allowed_domains: config.allowed_domains,
        project_id: config.project_id.trim().to_string(),
        prompt_summary: config.prompt_summary,
        prompt_action_items: config.prompt_action_items,
        updated_at: chrono::Utc::now().fixed_offset(),
    };

    let saved = site_config::replace(db, model).await?;
    info!("Site configuration saved for project: {}", saved.project_id);
    Ok(saved.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_name_derives_from_project() {
        let mut config = SiteConfig::placeholder();
        config.project_id = "acme-prod".to_string();
        assert_eq!(config.bucket_name(), "acme-prod-operation-insights-audio-files");
    }

    #[test]
    fn allows_email_compares_domain_case_insensitively() {
        let mut config = SiteConfig::placeholder();
        config.allowed_domains = vec!["Example.com".to_string()];
        assert!(config.allows_email("agent@example.COM"));
        assert!(config.allows_email("odd@name@example.com"));
        assert!(!config.allows_email("agent@example.com.evil.io"));
        assert!(!config.allows_email("agent@sub.example.com"));
        assert!(!config.allows_email("no-at-sign"));
        assert!(!config.allows_email("trailing@"));
    }

    #[test]
    fn parse_domains_trims_and_drops_blanks() {
        assert_eq!(
            parse_domains(" example.com, ,acme.io ,"),
            vec!["example.com".to_string(), "acme.io".to_string()]
        );
    }

    #[test]
    fn placeholder_carries_notice() {
        let current = Current {
            config: SiteConfig::placeholder(),
            is_placeholder: true,
        };
        assert_eq!(current.message(), Some(NO_CONFIG_MESSAGE));
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod store_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn stored_model() -> Model {
        Model {
            key: SINGLETON_KEY.to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "https://insights.example.com/auth/google/callback".to_string(),
            allowed_domains: vec!["example.com".to_string()],
            project_id: "acme".to_string(),
            prompt_summary: "Summarise".to_string(),
            prompt_action_items: "List actions".to_string(),
            updated_at: chrono::Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn find_or_placeholder_returns_placeholder_when_unsaved() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let current = find_or_placeholder(&db).await?;

        assert!(current.is_placeholder);
        assert_eq!(current.config.project_id, "YOUR-PROJECT");
        assert_eq!(db.into_transaction_log().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn find_or_placeholder_returns_stored_config() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_model()]])
            .into_connection();

        let current = find_or_placeholder(&db).await?;

        assert!(!current.is_placeholder);
        assert_eq!(current.message(), None);
        assert_eq!(current.config.project_id, "acme");
        Ok(())
    }

    #[tokio::test]
    async fn replace_issues_a_single_upsert() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_model()]])
            .into_connection();

        let mut config: SiteConfig = stored_model().into();
        config.project_id = "  acme ".to_string();
        let saved = replace(&db, config).await?;

        assert_eq!(saved.project_id, "acme");
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = log[0].statements()[0].sql.clone();
        assert!(sql.contains("ON CONFLICT"));
        Ok(())
    }
}
