use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fundraiser::FundraiserRequestId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub goal_amount: f64,
    pub amount_raised: f64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub source_request_id: Option<FundraiserRequestId>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl Campaign {
    pub fn progress_percent(&self) -> f64 {
        if self.goal_amount <= 0.0 {
            return 0.0;
        }

        self.amount_raised / self.goal_amount * 100.0
    }
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Category {
    #[serde(rename = "Medical")]
    Medical,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Animal Welfare")]
    AnimalWelfare,
    #[serde(rename = "Environment")]
    Environment,
    #[serde(rename = "Disaster Relief")]
    DisasterRelief,
    #[serde(rename = "Community")]
    Community,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Medical,
        Category::Education,
        Category::AnimalWelfare,
        Category::Environment,
        Category::DisasterRelief,
        Category::Community,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_use_their_display_names() {
        let names: Vec<String> = Category::ALL
            .iter()
            .map(|category| serde_json::to_value(category).unwrap())
            .map(|value| value.as_str().unwrap().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "Medical",
                "Education",
                "Animal Welfare",
                "Environment",
                "Disaster Relief",
                "Community"
            ]
        );
    }

    #[test]
    fn progress_of_zero_goal_is_zero() {
        let now = Utc::now();
        let mut campaign = Campaign {
            id: CampaignId::new(),
            title: "Books for Bihar".into(),
            description: "Library shelves for village schools".into(),
            category: Category::Education,
            goal_amount: 0.0,
            amount_raised: 100.0,
            image_url: None,
            is_active: true,
            source_request_id: None,
            created_at: now,
            modified_at: now,
        };

        assert_eq!(campaign.progress_percent(), 0.0);

        campaign.goal_amount = 400.0;
        assert_eq!(campaign.progress_percent(), 25.0);
    }
}
