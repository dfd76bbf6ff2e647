//! Persistence for the singleton site configuration row.

use super::error::Error;
use entity::site_configs::{ActiveModel, Column, Entity, Model, SINGLETON_KEY};
use log::*;
use sea_orm::{entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, ConnectionTrait};

/// Returns the stored configuration, or `None` if it has never been saved.
pub async fn find(db: &impl ConnectionTrait) -> Result<Option<Model>, Error> {
    Ok(Entity::find_by_id(SINGLETON_KEY.to_owned()).one(db).await?)
}

/// Replaces every field of the configuration in a single statement.
///
/// The insert-or-update is one `INSERT .. ON CONFLICT DO UPDATE`, so two
/// concurrent saves can never interleave fields; the last one to commit wins.
pub async fn replace(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!("Replacing site configuration for project: {}", model.project_id);

    let active_model = ActiveModel {
        key: Set(SINGLETON_KEY.to_owned()),
        client_id: Set(model.client_id),
        client_secret: Set(model.client_secret),
        callback_url: Set(model.callback_url),
        allowed_domains: Set(model.allowed_domains),
        project_id: Set(model.project_id),
        prompt_summary: Set(model.prompt_summary),
        prompt_action_items: Set(model.prompt_action_items),
        updated_at: Set(chrono::Utc::now().fixed_offset()),
    };

    let on_conflict = OnConflict::column(Column::Key)
        .update_columns([
            Column::ClientId,
            Column::ClientSecret,
            Column::CallbackUrl,
            Column::AllowedDomains,
            Column::ProjectId,
            Column::PromptSummary,
            Column::PromptActionItems,
            Column::UpdatedAt,
        ])
        .to_owned();

    Ok(Entity::insert(active_model)
        .on_conflict(on_conflict)
        .exec_with_returning(db)
        .await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn site_config(project_id: &str) -> Model {
        Model {
            key: SINGLETON_KEY.to_owned(),
            client_id: "client".to_owned(),
            client_secret: "secret".to_owned(),
            callback_url: "https://insights.example.com/auth/google/callback".to_owned(),
            allowed_domains: vec!["example.com".to_owned()],
            project_id: project_id.to_owned(),
            prompt_summary: String::new(),
            prompt_action_items: String::new(),
            updated_at: chrono::Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn find_returns_none_when_never_saved() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        assert!(find(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn replace_is_a_single_upsert_statement() -> Result<(), Error> {
        let saved = site_config("acme-prod");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[saved.clone()]])
            .into_connection();

        let result = replace(&db, saved.clone()).await?;
        assert_eq!(result.project_id, "acme-prod");

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let statements = log[0].statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].sql.contains(r#"ON CONFLICT ("key") DO UPDATE SET"#));
        Ok(())
    }
}
