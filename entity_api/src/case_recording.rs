//! Persistence operations for the case_recordings table.

use super::error::{EntityApiErrorKind, Error};
use entity::case_recordings::{ActiveModel, Column, Entity, Model};
use entity::recording_status::RecordingStatus;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, QueryOrder,
};

/// Inserts a new `processing` record for `case_id`. The database assigns the id.
pub async fn create(
    db: &impl ConnectionTrait,
    case_id: &str,
    submitted_at: DateTimeWithTimeZone,
) -> Result<Model, Error> {
    debug!("Creating case recording for case: {case_id}");

    let active_model = ActiveModel {
        case_id: Set(case_id.to_owned()),
        submitted_at: Set(submitted_at),
        status: Set(RecordingStatus::Processing),
        object_uri: Set(None),
        insight_payload: Set(None),
        updated_at: Set(submitted_at),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Records where the uploaded audio lives.
///
/// The address can only be written once: the update is conditional on the
/// column still being NULL, and a second attempt yields `RecordNotUpdated`.
pub async fn set_object_uri(
    db: &impl ConnectionTrait,
    id: Id,
    object_uri: &str,
) -> Result<(), Error> {
    let now = chrono::Utc::now();

    let result = Entity::update_many()
        .col_expr(Column::ObjectUri, Expr::value(object_uri.to_owned()))
        .col_expr(Column::UpdatedAt, Expr::value(now.fixed_offset()))
        .filter(Column::Id.eq(id))
        .filter(Column::ObjectUri.is_null())
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!("Object address for case recording {id} was already set or record is missing");
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotUpdated,
        });
    }

    debug!("Set object address for case recording {id}: {object_uri}");
    Ok(())
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Looks up a record from an id as it arrives in a URL path.
pub async fn find_by_id_str(db: &impl ConnectionTrait, id: &str) -> Result<Model, Error> {
    let id = crate::uuid_parse_str(id)?;
    find_by_id(db, id).await
}

/// All recordings filed under exactly `case_id`, ordered by case id descending
/// and then newest first.
pub async fn find_by_case_id(
    db: &impl ConnectionTrait,
    case_id: &str,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CaseId.eq(case_id))
        .order_by_desc(Column::CaseId)
        .order_by_desc(Column::SubmittedAt)
        .all(db)
        .await?)
}
