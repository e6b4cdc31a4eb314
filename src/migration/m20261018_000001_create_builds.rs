//! Migration: Create builds table and shared trigger function.
//!
//! A build is one CI run; suites and their rollups live inline as JSONB.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE builds (
                    id UUID PRIMARY KEY,
                    name VARCHAR(500) NOT NULL,
                    status VARCHAR(10) NOT NULL DEFAULT 'SKIPPED'
                        CHECK (status IN ('SKIPPED', 'PASS', 'ERROR', 'FAIL')),
                    start_time TIMESTAMPTZ,
                    end_time TIMESTAMPTZ,

                    -- {SKIPPED, PASS, ERROR, FAIL} counts over every execution in the build
                    histogram JSONB NOT NULL DEFAULT '{}',
                    -- [{name, key, histogram, status, start, end, executions: [...]}]
                    suites JSONB NOT NULL DEFAULT '[]',

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_builds_created_at ON builds(created_at DESC);

                CREATE TRIGGER update_builds_updated_at
                    BEFORE UPDATE ON builds
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
                DROP TRIGGER IF EXISTS update_builds_updated_at ON builds;
                DROP TABLE IF EXISTS builds CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
