use crate::entities::{environments, prelude::*, tags};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

/// Seeds the default environments and tags. Safe to run on every startup;
/// rows are looked up by their unique keys and only inserted when missing.
pub async fn seed_initial_data(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("🌱 Seeding default environments and tags...");

    let environments = vec![
        ("Development", "dev", "Local and shared development", 10),
        ("Staging", "staging", "Pre-production verification", 50),
        ("Production", "prod", "Live traffic", 90),
    ];

    for (name, slug, description, priority) in environments {
        let exists = Environments::find()
            .filter(environments::Column::Slug.eq(slug))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        environments::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description.to_string()),
            active: Set(true),
            priority: Set(priority),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        info!("🌍 Seeded environment '{}' ({})", name, slug);
    }

    let tags = vec![
        ("critical", "Configuration that must never drift", "#ef4444"),
        ("database", "Datastore connection settings", "#3b82f6"),
        ("feature-flag", "Runtime feature toggles", "#10b981"),
        ("deprecated", "Scheduled for removal", "#6b7280"),
    ];

    for (name, description, color) in tags {
        let exists = Tags::find()
            .filter(tags::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        tags::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            color: Set(color.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    info!("✅ Seed data is in place");
    Ok(())
}
