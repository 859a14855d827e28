use chrono::Utc;
use tracing::info;

use crate::campaign::{Campaign, CampaignId, Category};
use crate::config::Config;
use crate::database::Database;
use crate::error::Error;
use crate::user::manager::ensure_admin_account;

/// Prepares a fresh deployment: the bootstrap admin account when one is
/// configured, and a handful of demo campaigns when enabled and the
/// collection is still empty.
pub async fn seed(db: &dyn Database, config: &Config) -> Result<(), Error> {
    if let Some(admin) = &config.bootstrap_admin {
        let user_id = ensure_admin_account(db, &admin.email, &admin.password).await?;
        info!(user_id = %user_id, "bootstrap admin is ready");
    }

    if config.seed_campaigns && db.campaigns().count_campaigns().await? == 0 {
        let campaigns = demo_campaigns();
        for campaign in &campaigns {
            db.campaigns().insert_campaign(campaign).await?;
        }
        info!(count = campaigns.len(), "seeded demo campaigns");
    }

    Ok(())
}

fn demo_campaigns() -> Vec<Campaign> {
    let now = Utc::now();
    let campaign = |title: &str,
                    description: &str,
                    category: Category,
                    goal_amount: f64,
                    amount_raised: f64| Campaign {
        id: CampaignId::new(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        goal_amount,
        amount_raised,
        image_url: None,
        is_active: true,
        source_request_id: None,
        created_at: now,
        modified_at: now,
    };

    vec![
        campaign(
            "Save Ranjan From Sigmoid Colon Cancer",
            "Ranjan needs urgent chemotherapy and surgery for stage 3 sigmoid colon cancer.",
            Category::Medical,
            3676000.0,
            178002.0,
        ),
        campaign(
            "Help Priya Complete Her Engineering",
            "Priya is a first-generation college student who needs help with her final years of tuition.",
            Category::Education,
            250000.0,
            125000.0,
        ),
        campaign(
            "Rescue & Rehabilitation for Street Animals",
            "Shelter, food and veterinary care for injured and abandoned street animals.",
            Category::AnimalWelfare,
            150000.0,
            89000.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::database::test::MockDatabase;

    #[tokio::test]
    async fn demo_campaigns_are_added_to_an_empty_store() {
        let mut db = MockDatabase::new();
        let inserted = Arc::new(Mutex::new(vec![]));
        let inserted_clone = Arc::clone(&inserted);
        db.campaigns.on_count_campaigns = Box::new(|| Ok(0));
        db.campaigns.on_insert_campaign = Box::new(move |campaign| {
            inserted_clone.lock().unwrap().push(campaign.title.clone());
            Ok(())
        });
        let config = Config {
            seed_campaigns: true,
            ..Config::default()
        };

        seed(&db, &config).await.unwrap();

        assert_eq!(inserted.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn existing_campaigns_are_left_alone() {
        let mut db = MockDatabase::new();
        db.campaigns.on_count_campaigns = Box::new(|| Ok(4));
        let config = Config {
            seed_campaigns: true,
            ..Config::default()
        };

        seed(&db, &config).await.unwrap();
    }

    #[tokio::test]
    async fn nothing_happens_by_default() {
        let db = MockDatabase::new();

        seed(&db, &Config::default()).await.unwrap();
    }
}
