use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Holds a single row keyed 'site_config'
        let create_site_configs_sql = r#"
            CREATE TABLE IF NOT EXISTS call_insights.site_configs (
                key VARCHAR(64) PRIMARY KEY,
                client_id TEXT NOT NULL,
                client_secret TEXT NOT NULL,
                callback_url TEXT NOT NULL,
                allowed_domains TEXT[] NOT NULL DEFAULT '{}',
                project_id VARCHAR(255) NOT NULL,
                prompt_summary TEXT NOT NULL DEFAULT '',
                prompt_action_items TEXT NOT NULL DEFAULT '',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_site_configs_sql)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS call_insights.site_configs")
            .await?;

        Ok(())
    }
}
