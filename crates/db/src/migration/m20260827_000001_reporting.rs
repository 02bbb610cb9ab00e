//! Reporting tables migration.
//!
//! Creates report templates, the execution audit log, and the persisted
//! field catalog. The partial unique index on templates backs the
//! one-default-per-report-type invariant the repository enforces.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(REPORTING_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS report_executions CASCADE;\n\
             DROP TABLE IF EXISTS report_field_metadata CASCADE;\n\
             DROP TABLE IF EXISTS report_templates CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const REPORTING_SQL: &str = r"
-- Saved report templates
CREATE TABLE report_templates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    description TEXT,
    report_type VARCHAR(100) NOT NULL,
    configuration JSONB NOT NULL,
    is_public BOOLEAN NOT NULL DEFAULT false,
    is_default BOOLEAN NOT NULL DEFAULT false,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);

-- Listing: visible templates for a user, defaults first
CREATE INDEX idx_report_templates_owner ON report_templates(created_by) WHERE deleted_at IS NULL;
CREATE INDEX idx_report_templates_type ON report_templates(report_type, updated_at DESC) WHERE deleted_at IS NULL;

-- At most one live default per report type; the repository demotes the
-- previous default in the same transaction, this index backs it up
CREATE UNIQUE INDEX uq_report_templates_default
    ON report_templates(report_type)
    WHERE is_default AND deleted_at IS NULL;

-- Append-only execution audit log
CREATE TABLE report_executions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    template_id UUID REFERENCES report_templates(id) ON DELETE SET NULL,
    entity VARCHAR(50) NOT NULL,
    executed_by UUID NOT NULL,
    branch_id UUID,
    config_snapshot JSONB NOT NULL DEFAULT '{}',
    applied_filters JSONB NOT NULL DEFAULT '[]',
    row_count BIGINT NOT NULL DEFAULT 0,
    duration_ms BIGINT NOT NULL DEFAULT 0,
    export_format VARCHAR(20),
    file_size_bytes BIGINT,
    status VARCHAR(20) NOT NULL,
    error_message TEXT,
    executed_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_report_executions_user ON report_executions(executed_by, executed_at DESC);
CREATE INDEX idx_report_executions_time ON report_executions(executed_at DESC);

-- Persisted field catalog overriding the built-in defaults
CREATE TABLE report_field_metadata (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entity VARCHAR(50) NOT NULL,
    field_name VARCHAR(100) NOT NULL,
    display_name VARCHAR(255) NOT NULL,
    data_type VARCHAR(20) NOT NULL,
    filterable BOOLEAN NOT NULL DEFAULT true,
    sortable BOOLEAN NOT NULL DEFAULT true,
    aggregatable BOOLEAN NOT NULL DEFAULT false,
    groupable BOOLEAN NOT NULL DEFAULT false,
    default_visible BOOLEAN NOT NULL DEFAULT true,
    default_order INTEGER NOT NULL DEFAULT 0,
    format VARCHAR(50),
    enum_values JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_report_field UNIQUE (entity, field_name)
);

CREATE INDEX idx_report_field_entity ON report_field_metadata(entity, default_order);
";
