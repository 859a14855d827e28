use std::collections::{HashMap, HashSet};

use crate::campaign::CampaignId;
use crate::database::Database;
use crate::donation::Donation;
use crate::error::Error;

#[derive(Clone, Debug)]
pub struct DonationWithCampaign {
    pub donation: Donation,
    /// `None` when the campaign no longer exists.
    pub campaign_title: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardStats {
    pub total_donations: f64,
    pub total_campaigns: u64,
    pub total_donors: usize,
}

/// Every donation, newest first, alongside the title of the campaign it went to.
#[tracing::instrument(skip(db))]
pub async fn get_donations(db: &dyn Database) -> Result<Vec<DonationWithCampaign>, Error> {
    let donations = db.donations().fetch_donations().await?;
    let titles: HashMap<CampaignId, String> = db
        .campaigns()
        .fetch_campaigns()
        .await?
        .into_iter()
        .map(|campaign| (campaign.id, campaign.title))
        .collect();

    let donations = donations
        .into_iter()
        .map(|donation| DonationWithCampaign {
            campaign_title: titles.get(&donation.campaign_id).cloned(),
            donation,
        })
        .collect();

    Ok(donations)
}

/// Donors are counted by email, ignoring case and surrounding whitespace.
#[tracing::instrument(skip(db))]
pub async fn get_stats(db: &dyn Database) -> Result<DashboardStats, Error> {
    let donations = db.donations().fetch_donations().await?;
    let total_campaigns = db.campaigns().count_campaigns().await?;

    let total_donations = donations.iter().map(|donation| donation.amount).sum();
    let total_donors = donations
        .iter()
        .map(|donation| donation.donor_email.trim().to_lowercase())
        .collect::<HashSet<_>>()
        .len();

    Ok(DashboardStats {
        total_donations,
        total_campaigns,
        total_donors,
    })
}
