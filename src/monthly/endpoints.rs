use actix_web::web::{Data, Json};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::user::session::CurrentUser;

use super::manager::{self, MonthlyDonationForm};
use super::{MonthlyDonation, MonthlyDonationId, MONTHLY_PLANS};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonthlyPlanBody {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonthlyDonationBody {
    pub id: MonthlyDonationId,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: f64,
    pub plan_id: String,
    pub plan_name: String,
    pub is_indian_citizen: bool,
    pub receipt_number: String,
    pub created_at: DateTime<Utc>,
}

impl MonthlyDonationBody {
    pub fn render(donation: MonthlyDonation) -> MonthlyDonationBody {
        MonthlyDonationBody {
            id: donation.id,
            donor_name: donation.donor_name,
            donor_email: donation.donor_email,
            donor_phone: donation.donor_phone,
            amount: donation.amount,
            plan_id: donation.plan_id,
            plan_name: donation.plan_name,
            is_indian_citizen: donation.is_indian_citizen,
            receipt_number: donation.receipt_number,
            created_at: donation.created_at,
        }
    }
}

#[get("/monthly-plans")]
#[tracing::instrument]
pub async fn get_monthly_plans() -> Json<Vec<MonthlyPlanBody>> {
    let body = MONTHLY_PLANS
        .iter()
        .map(|plan| MonthlyPlanBody {
            id: plan.id.to_string(),
            name: plan.name.to_string(),
        })
        .collect();

    Json(body)
}

#[post("/monthly-donations")]
#[tracing::instrument(skip(db))]
pub async fn pledge_monthly_donation(
    db: Data<Box<dyn Database>>,
    current: CurrentUser,
    body: Json<MonthlyDonationForm>,
) -> Result<Json<MonthlyDonationBody>, Error> {
    let donation =
        manager::pledge_monthly_donation(&***db, &current.user, body.into_inner()).await?;

    Ok(Json(MonthlyDonationBody::render(donation)))
}
