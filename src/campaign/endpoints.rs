use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::fundraiser::FundraiserRequestId;
use crate::user::session::AdminUser;

use super::manager::{self, CampaignForm};
use super::{Campaign, CampaignId, Category};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub goal_amount: f64,
    pub amount_raised: f64,
    pub progress_percent: f64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub source_request_id: Option<FundraiserRequestId>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            progress_percent: campaign.progress_percent(),
            id: campaign.id,
            title: campaign.title,
            description: campaign.description,
            category: campaign.category,
            goal_amount: campaign.goal_amount,
            amount_raised: campaign.amount_raised,
            image_url: campaign.image_url,
            is_active: campaign.is_active,
            source_request_id: campaign.source_request_id,
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        }
    }
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: Data<Box<dyn Database>>) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_active_campaigns(&***db).await?;

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let campaign = manager::get_campaign_by_id(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[get("/admin/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_all_campaigns(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_all_campaigns(&***db).await?;

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[post("/admin/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
    body: Json<CampaignForm>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign = manager::create_campaign(&***db, body.into_inner()).await?;

    Ok(Json(CampaignBody::render(campaign)))
}
