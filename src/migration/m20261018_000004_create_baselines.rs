//! Migration: Create baselines table.
//!
//! At most one baseline per (view, fingerprint).

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
                CREATE TABLE baselines (
                    id UUID PRIMARY KEY,
                    screenshot_id UUID NOT NULL REFERENCES screenshots(id) ON DELETE RESTRICT,
                    view VARCHAR(500) NOT NULL,
                    platform JSONB NOT NULL,
                    screen_width INTEGER,
                    screen_height INTEGER,
                    fingerprint VARCHAR(500),
                    -- [{left, top, right, bottom}]
                    ignore_boxes JSONB NOT NULL DEFAULT '[]',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Uniqueness of the baseline target; legacy rows without a fingerprint are exempt
                CREATE UNIQUE INDEX idx_baselines_view_fingerprint ON baselines(view, fingerprint)
                    WHERE fingerprint IS NOT NULL;

                CREATE INDEX idx_baselines_view ON baselines(view);
                CREATE INDEX idx_baselines_screenshot_id ON baselines(screenshot_id);

                CREATE TRIGGER update_baselines_updated_at
                    BEFORE UPDATE ON baselines
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
                DROP TRIGGER IF EXISTS update_baselines_updated_at ON baselines;
                DROP TABLE IF EXISTS baselines CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
