//! Quest catalog seeding.
//!
//! Upserts the built-in quest catalog into the `quests` table. Safe to run
//! repeatedly; existing entries are updated in place.

use secrecy::SecretString;
use tracing::info;

use farmstellar_api::db::{self, QuestRepository};
use farmstellar_api::models::quest::builtin_catalog;

/// Seed the quest catalog.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or a database operation
/// fails.
pub async fn quest_catalog() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    let quests = QuestRepository::new(&pool);

    let catalog = builtin_catalog();
    let count = catalog.len();

    for quest in &catalog {
        quests.upsert(quest).await?;
        info!(quest_id = %quest.id, xp_reward = quest.xp_reward, "seeded quest");
    }

    info!(count, "quest catalog seeded");
    Ok(())
}
