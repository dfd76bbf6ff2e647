//! SeaORM Entity for the case_recordings table.
//! One row per uploaded call recording.

use crate::recording_status::RecordingStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::case_recordings::Model)]
#[sea_orm(schema_name = "call_insights", table_name = "case_recordings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Business case this recording belongs to. Not unique.
    pub case_id: String,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub submitted_at: DateTimeWithTimeZone,

    pub status: RecordingStatus,

    /// Storage address of the uploaded audio, e.g. `gs://bucket/key.wav`.
    pub object_uri: Option<String>,

    /// Serialized JSON written by the insights pipeline.
    #[sea_orm(column_type = "Text", nullable)]
    pub insight_payload: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
