use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use crate::campaign::{Campaign, CampaignId, Category};
use crate::database::Database;
use crate::error::Error;
use crate::violations::{non_empty, Violations};

use super::{FundraiserRequest, FundraiserRequestId, RequestStatus};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FundraiserRequestForm {
    pub requester_name: String,
    pub requester_email: String,
    pub requester_phone: Option<String>,
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub goal_amount: Option<f64>,
    pub story: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

#[tracing::instrument(skip(db))]
pub async fn submit_request(
    db: &dyn Database,
    form: FundraiserRequestForm,
) -> Result<FundraiserRequest, Error> {
    let mut violations = Violations::new();
    violations.require_text("requester_name", &form.requester_name);
    violations.require_email("requester_email", &form.requester_email);
    violations.require_text("title", &form.title);
    violations.require_text("description", &form.description);
    violations.require_some("category", &form.category);
    violations.require_positive_amount("goal_amount", form.goal_amount);
    violations.into_result()?;

    let (category, goal_amount) = match (form.category, form.goal_amount) {
        (Some(category), Some(goal_amount)) => (category, goal_amount),
        _ => return Err(Error::ExistentialState("validated request form is incomplete".into())),
    };

    let now = Utc::now();
    let request = FundraiserRequest {
        id: FundraiserRequestId::new(),
        requester_name: form.requester_name.trim().to_string(),
        requester_email: form.requester_email.trim().to_string(),
        requester_phone: non_empty(form.requester_phone),
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        category,
        goal_amount,
        story: non_empty(form.story),
        image_url: non_empty(form.image_url),
        video_url: non_empty(form.video_url),
        status: RequestStatus::Pending,
        campaign_id: None,
        created_at: now,
        modified_at: now,
    };

    db.fundraiser_requests().insert_request(&request).await?;

    Ok(request)
}

#[tracing::instrument(skip(db))]
pub async fn get_requests(
    db: &dyn Database,
    status: Option<RequestStatus>,
) -> Result<Vec<FundraiserRequest>, Error> {
    let requests = db.fundraiser_requests().fetch_requests(status).await?;

    Ok(requests)
}

#[tracing::instrument(skip(db))]
pub async fn expect_pending_request(
    db: &dyn Database,
    request_id: FundraiserRequestId,
) -> Result<FundraiserRequest, Error> {
    let request = db
        .fundraiser_requests()
        .fetch_request_by_id(request_id)
        .await?
        .ok_or(Error::FundraiserRequestNotFound { request_id })?;

    if request.status != RequestStatus::Pending {
        return Err(Error::FundraiserRequestIsNotPending {
            request_id,
            status: request.status,
        });
    }

    Ok(request)
}

/// Turns a pending request into a live campaign.
///
/// The request is claimed first with a conditional status update, so of two
/// concurrent approvals only one proceeds to create a campaign. If the
/// campaign cannot be inserted the claim is reverted to `Pending`.
#[tracing::instrument(skip(db))]
pub async fn approve_request(
    db: &dyn Database,
    request_id: FundraiserRequestId,
) -> Result<(FundraiserRequest, Campaign), Error> {
    let request = expect_pending_request(db, request_id).await?;

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        title: request.title.clone(),
        description: request.description.clone(),
        category: request.category,
        goal_amount: request.goal_amount,
        amount_raised: 0.0,
        image_url: request.image_url.clone(),
        is_active: true,
        source_request_id: Some(request.id),
        created_at: now,
        modified_at: now,
    };

    let request = db
        .fundraiser_requests()
        .update_request_status(request, RequestStatus::Approved, Some(campaign.id))
        .await?;

    if let Err(err) = db.campaigns().insert_campaign(&campaign).await {
        if let Err(revert_err) = db
            .fundraiser_requests()
            .update_request_status(request, RequestStatus::Pending, None)
            .await
        {
            error!(
                request_id = %request_id,
                campaign_id = %campaign.id,
                "request is marked approved but has no campaign: {}",
                revert_err
            );
        }

        return Err(err);
    }

    info!(request_id = %request_id, campaign_id = %campaign.id, "fundraiser request approved");

    Ok((request, campaign))
}

#[tracing::instrument(skip(db))]
pub async fn reject_request(
    db: &dyn Database,
    request_id: FundraiserRequestId,
) -> Result<FundraiserRequest, Error> {
    let request = expect_pending_request(db, request_id).await?;

    let request = db
        .fundraiser_requests()
        .update_request_status(request, RequestStatus::Rejected, None)
        .await?;

    info!(request_id = %request_id, "fundraiser request rejected");

    Ok(request)
}
