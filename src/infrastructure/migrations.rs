use crate::entities::{environments, tags, template_tags, templates};
use anyhow::bail;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Schema, Statement};
use tracing::{info, warn};

/// Ordered migration catalogue. Versions are monotonically increasing and
/// the version table tracks the highest applied one.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, "create core tables"),
    (2, "add uniqueness and lookup indexes"),
    (3, "add updated_at triggers"),
];

const TIMESTAMPED_TABLES: &[&str] = &["tags", "environments", "templates"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Highest applied version, `None` before the first migration.
    pub version: Option<i64>,
    /// Set while a migration body runs; a crash mid-migration leaves it
    /// set and blocks further runs until an operator forces a version.
    pub dirty: bool,
}

pub struct MigrationRunner {
    db: DatabaseConnection,
}

impl MigrationRunner {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn status(&self) -> anyhow::Result<MigrationStatus> {
        self.ensure_version_table().await?;
        self.read_version().await
    }

    /// Applies every pending migration in order. Refuses to run while the
    /// version table is dirty.
    pub async fn up(&self) -> anyhow::Result<MigrationStatus> {
        self.ensure_version_table().await?;
        let status = self.read_version().await?;
        if status.dirty {
            bail!(
                "migration state is dirty at version {}; inspect the schema and force a version before retrying",
                status.version.unwrap_or(0)
            );
        }

        let current = status.version.unwrap_or(0);
        let pending: Vec<&(i64, &str)> =
            MIGRATIONS.iter().filter(|(v, _)| *v > current).collect();
        if pending.is_empty() {
            info!("No new migrations to apply");
            return Ok(status);
        }

        for (version, name) in pending {
            info!("🔄 Applying migration {}: {}", version, name);
            self.write_version(*version, true).await?;
            self.apply_up(*version).await?;
            self.write_version(*version, false).await?;
        }

        let status = self.read_version().await?;
        info!("✅ Migrations complete at version {}", status.version.unwrap_or(0));
        Ok(status)
    }

    /// Rolls back up to `steps` applied migrations, newest first.
    pub async fn down(&self, steps: u32) -> anyhow::Result<MigrationStatus> {
        self.ensure_version_table().await?;
        let status = self.read_version().await?;
        if status.dirty {
            bail!(
                "migration state is dirty at version {}; inspect the schema and force a version before retrying",
                status.version.unwrap_or(0)
            );
        }

        let current = status.version.unwrap_or(0);
        let applied: Vec<usize> = (0..MIGRATIONS.len())
            .filter(|i| MIGRATIONS[*i].0 <= current)
            .collect();
        if applied.is_empty() {
            info!("No migrations to roll back");
            return Ok(status);
        }

        for index in applied.into_iter().rev().take(steps as usize) {
            let (version, name) = MIGRATIONS[index];
            let previous = if index == 0 { 0 } else { MIGRATIONS[index - 1].0 };
            info!("⏪ Rolling back migration {}: {}", version, name);
            self.write_version(version, true).await?;
            self.apply_down(version).await?;
            self.write_version(previous, false).await?;
        }

        self.read_version().await
    }

    /// Overwrites the recorded version and clears the dirty flag without
    /// running any migration bodies. Operator escape hatch after a failed
    /// migration has been resolved by hand.
    pub async fn force_version(&self, version: i64) -> anyhow::Result<MigrationStatus> {
        self.ensure_version_table().await?;
        warn!(
            "⚠️ Forcing migration version to {} without running migration bodies",
            version
        );
        self.write_version(version, false).await?;
        self.read_version().await
    }

    async fn apply_up(&self, version: i64) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        match version {
            1 => {
                let schema = Schema::new(backend);
                let stmts = vec![
                    schema.create_table_from_entity(tags::Entity).to_owned(),
                    schema.create_table_from_entity(environments::Entity).to_owned(),
                    schema.create_table_from_entity(templates::Entity).to_owned(),
                    schema.create_table_from_entity(template_tags::Entity).to_owned(),
                ];
                for stmt in stmts {
                    self.db.execute(backend.build(&stmt)).await?;
                }
            }
            2 => {
                self.exec(
                    "CREATE UNIQUE INDEX uq_templates_name_environment \
                     ON templates (name, environment_id)",
                )
                .await?;
                self.exec("CREATE INDEX idx_templates_environment_id ON templates (environment_id)")
                    .await?;
                self.exec("CREATE INDEX idx_template_tags_tag_id ON template_tags (tag_id)")
                    .await?;
                if backend == DatabaseBackend::Postgres {
                    self.exec(
                        "ALTER TABLE environments ADD CONSTRAINT chk_environments_priority \
                         CHECK (priority >= 0 AND priority <= 100)",
                    )
                    .await?;
                }
            }
            3 => {
                if backend == DatabaseBackend::Postgres {
                    self.exec(
                        "CREATE OR REPLACE FUNCTION set_row_updated_at() RETURNS trigger AS $$ \
                         BEGIN NEW.updated_at = NOW(); RETURN NEW; END; \
                         $$ LANGUAGE plpgsql",
                    )
                    .await?;
                    for table in TIMESTAMPED_TABLES {
                        self.exec(&format!(
                            "CREATE TRIGGER trg_{table}_updated_at BEFORE UPDATE ON {table} \
                             FOR EACH ROW EXECUTE FUNCTION set_row_updated_at()"
                        ))
                        .await?;
                    }
                } else {
                    // SQLite has no BEFORE-UPDATE assignment; the AFTER
                    // trigger rewrites the row and recursive triggers are
                    // off by default, so it fires once.
                    for table in TIMESTAMPED_TABLES {
                        self.exec(&format!(
                            "CREATE TRIGGER trg_{table}_updated_at AFTER UPDATE ON {table} \
                             FOR EACH ROW BEGIN \
                             UPDATE {table} SET updated_at = STRFTIME('%Y-%m-%d %H:%M:%f', 'NOW') \
                             WHERE id = NEW.id; \
                             END"
                        ))
                        .await?;
                    }
                }
            }
            _ => bail!("unknown migration version {}", version),
        }
        Ok(())
    }

    async fn apply_down(&self, version: i64) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        match version {
            1 => {
                for table in ["template_tags", "templates", "environments", "tags"] {
                    self.exec(&format!("DROP TABLE IF EXISTS {table}")).await?;
                }
            }
            2 => {
                self.exec("DROP INDEX IF EXISTS uq_templates_name_environment").await?;
                self.exec("DROP INDEX IF EXISTS idx_templates_environment_id").await?;
                self.exec("DROP INDEX IF EXISTS idx_template_tags_tag_id").await?;
                if backend == DatabaseBackend::Postgres {
                    self.exec(
                        "ALTER TABLE environments DROP CONSTRAINT IF EXISTS chk_environments_priority",
                    )
                    .await?;
                }
            }
            3 => {
                for table in TIMESTAMPED_TABLES {
                    if backend == DatabaseBackend::Postgres {
                        self.exec(&format!("DROP TRIGGER IF EXISTS trg_{table}_updated_at ON {table}"))
                            .await?;
                    } else {
                        self.exec(&format!("DROP TRIGGER IF EXISTS trg_{table}_updated_at"))
                            .await?;
                    }
                }
                if backend == DatabaseBackend::Postgres {
                    self.exec("DROP FUNCTION IF EXISTS set_row_updated_at").await?;
                }
            }
            _ => bail!("unknown migration version {}", version),
        }
        Ok(())
    }

    async fn ensure_version_table(&self) -> anyhow::Result<()> {
        self.exec(
            "CREATE TABLE IF NOT EXISTS schema_migrations \
             (version BIGINT NOT NULL, dirty BOOLEAN NOT NULL)",
        )
        .await?;
        Ok(())
    }

    async fn read_version(&self) -> anyhow::Result<MigrationStatus> {
        let backend = self.db.get_database_backend();
        let row = self
            .db
            .query_one(Statement::from_string(
                backend,
                "SELECT version, dirty FROM schema_migrations LIMIT 1".to_string(),
            ))
            .await?;

        match row {
            Some(row) => {
                let version: i64 = row.try_get("", "version")?;
                let dirty: bool = row.try_get("", "dirty")?;
                Ok(MigrationStatus {
                    version: (version > 0).then_some(version),
                    dirty,
                })
            }
            None => Ok(MigrationStatus {
                version: None,
                dirty: false,
            }),
        }
    }

    async fn write_version(&self, version: i64, dirty: bool) -> anyhow::Result<()> {
        self.exec("DELETE FROM schema_migrations").await?;
        self.exec(&format!(
            "INSERT INTO schema_migrations (version, dirty) VALUES ({}, {})",
            version,
            if dirty { "TRUE" } else { "FALSE" }
        ))
        .await?;
        Ok(())
    }

    async fn exec(&self, sql: &str) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_string(backend, sql.to_string()))
            .await?;
        Ok(())
    }
}
