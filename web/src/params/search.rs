use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    /// Case id to list recordings for. Absent or blank lists nothing.
    #[serde(rename = "case-id")]
    pub(crate) case_id: Option<String>,
}

impl SearchParams {
    pub(crate) fn case_id(&self) -> &str {
        self.case_id.as_deref().map(str::trim).unwrap_or_default()
    }
}
