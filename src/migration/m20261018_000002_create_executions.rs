//! Migration: Create executions table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE executions (
                    id UUID PRIMARY KEY,
                    build_id UUID NOT NULL REFERENCES builds(id) ON DELETE CASCADE,
                    title VARCHAR(1000) NOT NULL,
                    suite_name VARCHAR(500) NOT NULL,
                    suite_key VARCHAR(500) NOT NULL,
                    status VARCHAR(10) NOT NULL
                        CHECK (status IN ('SKIPPED', 'PASS', 'ERROR', 'FAIL')),
                    start_time TIMESTAMPTZ,
                    end_time TIMESTAMPTZ,

                    -- [{name, status, start, end, steps: [{name, status, timestamp, screenshot_id}]}]
                    actions JSONB NOT NULL DEFAULT '[]',
                    -- [{platform_name, device_name, browser_name, screen_width, screen_height}]
                    platforms JSONB NOT NULL DEFAULT '[]',

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_executions_build_id ON executions(build_id);
                CREATE INDEX idx_executions_build_suite ON executions(build_id, suite_key);

                CREATE TRIGGER update_executions_updated_at
                    BEFORE UPDATE ON executions
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_executions_updated_at ON executions;
                DROP TABLE IF EXISTS executions CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
