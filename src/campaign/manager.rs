use chrono::Utc;
use serde::Deserialize;

use crate::database::Database;
use crate::error::Error;
use crate::violations::{non_empty, Violations};

use super::{Campaign, CampaignId, Category};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CampaignForm {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub goal_amount: Option<f64>,
    pub image_url: Option<String>,
}

#[tracing::instrument(skip(db))]
pub async fn create_campaign(db: &dyn Database, form: CampaignForm) -> Result<Campaign, Error> {
    let mut violations = Violations::new();
    violations.require_text("title", &form.title);
    violations.require_text("description", &form.description);
    violations.require_some("category", &form.category);
    violations.require_positive_amount("goal_amount", form.goal_amount);
    violations.into_result()?;

    let (category, goal_amount) = match (form.category, form.goal_amount) {
        (Some(category), Some(goal_amount)) => (category, goal_amount),
        _ => return Err(Error::ExistentialState("validated campaign form is incomplete".into())),
    };

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        category,
        goal_amount,
        amount_raised: 0.0,
        image_url: non_empty(form.image_url),
        is_active: true,
        source_request_id: None,
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_active_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_active_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_all_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}
