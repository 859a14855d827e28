use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::{CampaignId, Category};
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type FundraiserRequestId = TypedId<FundraiserRequest>;

/// A public proposal for a campaign. It stays `Pending` until an admin
/// reviews it; approval links it to the campaign created from it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FundraiserRequest {
    #[serde(rename = "_id")]
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
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for FundraiserRequest {
    fn tag() -> &'static str {
        "FRQ"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}
