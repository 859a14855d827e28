use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod receipt;
pub use endpoints::*;

pub type DonationId = TypedId<Donation>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Donation {
    #[serde(rename = "_id")]
    pub id: DonationId,
    pub campaign_id: CampaignId,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: f64,
    pub message: Option<String>,
    pub receipt_number: String,
    pub user_id: Option<UserId>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Donation {
    fn tag() -> &'static str {
        "DON"
    }
}
