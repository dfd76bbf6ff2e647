use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Processing status of an uploaded call recording.
///
/// Uploads only ever write `Processing`; the insights pipeline moves a record
/// to `Completed` or `Failed` once it has finished with the audio.
#[derive(
    Debug,
    Clone,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "recording_status")]
pub enum RecordingStatus {
    #[sea_orm(string_value = "processing")]
    #[default]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for RecordingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingStatus::Processing => write!(fmt, "processing"),
            RecordingStatus::Completed => write!(fmt, "completed"),
            RecordingStatus::Failed => write!(fmt, "failed"),
        }
    }
}
