use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type MonthlyDonationId = TypedId<MonthlyDonation>;

/// A recurring pledge against one of the [`MONTHLY_PLANS`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MonthlyDonation {
    #[serde(rename = "_id")]
    pub id: MonthlyDonationId,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: f64,
    pub plan_id: String,
    pub plan_name: String,
    pub is_indian_citizen: bool,
    pub receipt_number: String,
    pub user_id: UserId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for MonthlyDonation {
    fn tag() -> &'static str {
        "MDN"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MonthlyPlan {
    pub id: &'static str,
    pub name: &'static str,
}

pub const MONTHLY_PLANS: [MonthlyPlan; 9] = [
    MonthlyPlan {
        id: "critical",
        name: "Support Patients Battling Critical Diseases",
    },
    MonthlyPlan {
        id: "children",
        name: "Support Children Fighting Critical Diseases",
    },
    MonthlyPlan {
        id: "cancer",
        name: "Support Patients Fighting Cancer",
    },
    MonthlyPlan {
        id: "transplant",
        name: "Support Patients Needing Organ Transplant",
    },
    MonthlyPlan {
        id: "rare",
        name: "Support Patients Battling Rare Disease",
    },
    MonthlyPlan {
        id: "animal",
        name: "Contribute Towards Animal Welfare",
    },
    MonthlyPlan {
        id: "hunger",
        name: "Support To Fill A Plate",
    },
    MonthlyPlan {
        id: "education",
        name: "Support To Send a Child to School",
    },
    MonthlyPlan {
        id: "elderly",
        name: "Support To Give an Elderly a Second Inning",
    },
];

pub fn find_plan(plan_id: &str) -> Option<&'static MonthlyPlan> {
    MONTHLY_PLANS.iter().find(|plan| plan.id == plan_id)
}
