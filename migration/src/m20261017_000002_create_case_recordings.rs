use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE call_insights.recording_status AS ENUM (
                    'processing',
                    'completed',
                    'failed'
                )",
            )
            .await?;

        let create_recordings_sql = r#"
            CREATE TABLE IF NOT EXISTS call_insights.case_recordings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_id VARCHAR(255) NOT NULL,
                submitted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                status call_insights.recording_status NOT NULL DEFAULT 'processing',
                object_uri TEXT,
                insight_payload TEXT,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_recordings_sql)
            .await?;

        // Search filters on case_id and sorts newest first within a case
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS case_recordings_case_id_submitted_at_idx
                    ON call_insights.case_recordings (case_id, submitted_at DESC)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS call_insights.case_recordings")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS call_insights.recording_status")
            .await?;

        Ok(())
    }
}
