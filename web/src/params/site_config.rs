use domain::site_config::{parse_domains, SiteConfig};
use serde::Deserialize;

/// The settings form. Every save replaces the whole configuration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigForm {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) callback_url: String,
    /// Comma separated, e.g. `example.com, example.org`.
    pub(crate) allowed_domains: String,
    pub(crate) project_id: String,
    #[serde(default)]
    pub(crate) prompt_summary: String,
    #[serde(default)]
    pub(crate) prompt_action_items: String,
}

impl From<ConfigForm> for SiteConfig {
    fn from(form: ConfigForm) -> Self {
        SiteConfig {
            client_id: form.client_id,
            client_secret: form.client_secret,
            callback_url: form.callback_url,
            allowed_domains: parse_domains(&form.allowed_domains),
            project_id: form.project_id,
            prompt_summary: form.prompt_summary,
            prompt_action_items: form.prompt_action_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_splits_allowed_domains() {
        let form = ConfigForm {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            callback_url: "https://insights.example.com/auth/google/callback".to_string(),
            allowed_domains: "example.com, example.org,,".to_string(),
            project_id: "acme".to_string(),
            prompt_summary: String::new(),
            prompt_action_items: String::new(),
        };

        let config = SiteConfig::from(form);

        assert_eq!(config.allowed_domains, vec!["example.com", "example.org"]);
        assert_eq!(config.bucket_name(), "acme-operation-insights-audio-files");
    }
}
