//! Migration: Create screenshots table.
//!
//! Rasters live in the blob store; rows hold the key and capture metadata.

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
                CREATE TABLE screenshots (
                    id UUID PRIMARY KEY, -- UUIDv7 for time-ordered sorting
                    build_id UUID NOT NULL REFERENCES builds(id) ON DELETE CASCADE,
                    view VARCHAR(500) NOT NULL,
                    captured_at TIMESTAMPTZ NOT NULL,
                    path VARCHAR(1000) NOT NULL,              -- blob-store key
                    platform JSONB,
                    width INTEGER CHECK (width > 0),
                    height INTEGER CHECK (height > 0),
                    fingerprint VARCHAR(500),                 -- NULL when not a valid baseline target
                    kind VARCHAR(20) NOT NULL DEFAULT 'captured'
                        CHECK (kind IN ('captured', 'dynamic')),
                    thumbnail_path VARCHAR(1000),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_screenshots_build_id ON screenshots(build_id);

                -- History lookup for dynamic baselines
                CREATE INDEX idx_screenshots_target_history
                    ON screenshots(view, fingerprint, captured_at DESC)
                    WHERE kind = 'captured' AND fingerprint IS NOT NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS screenshots CASCADE;")
            .await?;

        Ok(())
    }
}
