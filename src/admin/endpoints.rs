use actix_web::get;
use actix_web::web::{Data, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::database::Database;
use crate::donation::DonationId;
use crate::error::Error;
use crate::user::session::AdminUser;
use crate::user::UserId;

use super::manager::{self, DashboardStats, DonationWithCampaign};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminDonationBody {
    pub id: DonationId,
    pub campaign_id: CampaignId,
    pub campaign_title: Option<String>,
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: f64,
    pub message: Option<String>,
    pub receipt_number: String,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl AdminDonationBody {
    pub fn render(entry: DonationWithCampaign) -> AdminDonationBody {
        let donation = entry.donation;

        AdminDonationBody {
            id: donation.id,
            campaign_id: donation.campaign_id,
            campaign_title: entry.campaign_title,
            donor_name: donation.donor_name,
            donor_email: donation.donor_email,
            donor_phone: donation.donor_phone,
            amount: donation.amount,
            message: donation.message,
            receipt_number: donation.receipt_number,
            user_id: donation.user_id,
            created_at: donation.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsBody {
    pub total_donations: f64,
    pub total_campaigns: u64,
    pub total_donors: usize,
}

impl StatsBody {
    pub fn render(stats: DashboardStats) -> StatsBody {
        StatsBody {
            total_donations: stats.total_donations,
            total_campaigns: stats.total_campaigns,
            total_donors: stats.total_donors,
        }
    }
}

#[get("/admin/donations")]
#[tracing::instrument(skip(db))]
pub async fn get_donations(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminDonationBody>>, Error> {
    let donations = manager::get_donations(&***db).await?;

    let body = donations.into_iter().map(AdminDonationBody::render).collect();

    Ok(Json(body))
}

#[get("/admin/stats")]
#[tracing::instrument(skip(db))]
pub async fn get_stats(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
) -> Result<Json<StatsBody>, Error> {
    let stats = manager::get_stats(&***db).await?;

    Ok(Json(StatsBody::render(stats)))
}
