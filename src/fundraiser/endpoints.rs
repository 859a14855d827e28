use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::{CampaignBody, CampaignId, Category};
use crate::database::Database;
use crate::error::Error;
use crate::user::session::AdminUser;

use super::manager::{self, FundraiserRequestForm};
use super::{FundraiserRequest, FundraiserRequestId, RequestStatus};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FundraiserRequestBody {
    pub id: FundraiserRequestId,
    pub requester_name: String,
    pub requester_email: String,
    pub requester_phone: Option<String>,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub goal_amount: f64,
    pub story: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub status: RequestStatus,
    pub campaign_id: Option<CampaignId>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl FundraiserRequestBody {
    pub fn render(request: FundraiserRequest) -> FundraiserRequestBody {
        FundraiserRequestBody {
            id: request.id,
            requester_name: request.requester_name,
            requester_email: request.requester_email,
            requester_phone: request.requester_phone,
            title: request.title,
            description: request.description,
            category: request.category,
            goal_amount: request.goal_amount,
            story: request.story,
            image_url: request.image_url,
            video_url: request.video_url,
            status: request.status,
            campaign_id: request.campaign_id,
            created_at: request.created_at,
            modified_at: request.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalBody {
    pub request: FundraiserRequestBody,
    pub campaign: CampaignBody,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
}

#[post("/fundraiser-requests")]
#[tracing::instrument(skip(db))]
pub async fn submit_fundraiser_request(
    db: Data<Box<dyn Database>>,
    body: Json<FundraiserRequestForm>,
) -> Result<Json<FundraiserRequestBody>, Error> {
    let request = manager::submit_request(&***db, body.into_inner()).await?;

    Ok(Json(FundraiserRequestBody::render(request)))
}

#[get("/admin/fundraiser-requests")]
#[tracing::instrument(skip(db))]
pub async fn get_fundraiser_requests(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
    query: Query<RequestFilter>,
) -> Result<Json<Vec<FundraiserRequestBody>>, Error> {
    let requests = manager::get_requests(&***db, query.into_inner().status).await?;

    let body = requests
        .into_iter()
        .map(FundraiserRequestBody::render)
        .collect();

    Ok(Json(body))
}

#[post("/admin/fundraiser-requests/{request_id}/approve")]
#[tracing::instrument(skip(db))]
pub async fn approve_fundraiser_request(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
    params: Path<FundraiserRequestId>,
) -> Result<Json<ApprovalBody>, Error> {
    let request_id = params.into_inner();
    let (request, campaign) = manager::approve_request(&***db, request_id).await?;

    Ok(Json(ApprovalBody {
        request: FundraiserRequestBody::render(request),
        campaign: CampaignBody::render(campaign),
    }))
}

#[post("/admin/fundraiser-requests/{request_id}/reject")]
#[tracing::instrument(skip(db))]
pub async fn reject_fundraiser_request(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
    params: Path<FundraiserRequestId>,
) -> Result<Json<FundraiserRequestBody>, Error> {
    let request_id = params.into_inner();
    let request = manager::reject_request(&***db, request_id).await?;

    Ok(Json(FundraiserRequestBody::render(request)))
}
