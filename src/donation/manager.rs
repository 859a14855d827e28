use chrono::Utc;
use serde::Deserialize;
use tracing::error;

use crate::campaign::{Campaign, CampaignId};
use crate::database::Database;
use crate::error::Error;
use crate::user::UserId;
use crate::violations::{non_empty, Violations};

use super::receipt::generate_receipt_number;
use super::{Donation, DonationId};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DonationForm {
    pub donor_name: String,
    pub donor_email: String,
    pub donor_phone: Option<String>,
    pub amount: Option<f64>,
    pub message: Option<String>,
}

/// Records a one-off donation and credits it to the campaign total.
///
/// The donation row is the source of truth: if crediting the campaign fails
/// after the insert, the failure is logged and the receipt is still returned
/// so the donor does not retry and pay twice.
#[tracing::instrument(skip(db))]
pub async fn make_donation(
    db: &dyn Database,
    campaign_id: CampaignId,
    user_id: Option<UserId>,
    form: DonationForm,
) -> Result<(Donation, Campaign), Error> {
    let mut violations = Violations::new();
    violations.require_text("donor_name", &form.donor_name);
    violations.require_email("donor_email", &form.donor_email);
    violations.require_positive_amount("amount", form.amount);
    violations.into_result()?;

    let amount = form
        .amount
        .ok_or_else(|| Error::ExistentialState("validated donation has no amount".into()))?;

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    if !campaign.is_active {
        return Err(Error::CampaignIsNotActive { campaign_id });
    }

    let now = Utc::now();
    let donation = Donation {
        id: DonationId::new(),
        campaign_id,
        donor_name: form.donor_name.trim().to_string(),
        donor_email: form.donor_email.trim().to_string(),
        donor_phone: non_empty(form.donor_phone),
        amount,
        message: non_empty(form.message),
        receipt_number: generate_receipt_number(now),
        user_id,
        created_at: now,
    };

    db.donations().insert_donation(&donation).await?;

    if let Err(err) = db
        .campaigns()
        .increment_amount_raised(campaign_id, amount)
        .await
    {
        error!(
            donation_id = %donation.id,
            campaign_id = %campaign_id,
            "donation recorded but campaign total was not updated: {}",
            err
        );
    }

    Ok((donation, campaign))
}

#[tracing::instrument(skip(db))]
pub async fn get_receipt(
    db: &dyn Database,
    receipt_number: &str,
) -> Result<(Donation, Option<Campaign>), Error> {
    let donation = db
        .donations()
        .fetch_donation_by_receipt_number(receipt_number)
        .await?
        .ok_or_else(|| Error::ReceiptNotFound {
            receipt_number: receipt_number.to_string(),
        })?;

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(donation.campaign_id)
        .await?;

    Ok((donation, campaign))
}
