use actix_web::http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::{Campaign, CampaignId};
use crate::database::Database;
use crate::error::Error;
use crate::user::session::CurrentUser;

use super::manager::{self, DonationForm};
use super::receipt::{receipt_file_name, render_receipt_text, ReceiptDetails};
use super::{Donation, DonationId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReceiptBody {
    pub donation_id: DonationId,
    pub receipt_number: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: f64,
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub created_at: DateTime<Utc>,
}

impl ReceiptBody {
    pub fn render(donation: Donation, campaign: &Campaign) -> ReceiptBody {
        ReceiptBody {
            donation_id: donation.id,
            receipt_number: donation.receipt_number,
            donor_name: donation.donor_name,
            donor_email: donation.donor_email,
            amount: donation.amount,
            campaign_id: campaign.id,
            campaign_title: campaign.title.clone(),
            created_at: donation.created_at,
        }
    }
}

#[post("/campaigns/{campaign_id}/donations")]
#[tracing::instrument(skip(db))]
pub async fn donate_to_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    user: Option<CurrentUser>,
    body: Json<DonationForm>,
) -> Result<Json<ReceiptBody>, Error> {
    let campaign_id = params.into_inner();
    let user_id = user.map(|user| user.user.id);

    let (donation, campaign) =
        manager::make_donation(&***db, campaign_id, user_id, body.into_inner()).await?;

    Ok(Json(ReceiptBody::render(donation, &campaign)))
}

#[get("/receipts/{receipt_number}")]
#[tracing::instrument(skip(db))]
pub async fn download_receipt(
    db: Data<Box<dyn Database>>,
    params: Path<String>,
) -> Result<HttpResponse, Error> {
    let receipt_number = params.into_inner();
    let (donation, campaign) = manager::get_receipt(&***db, &receipt_number).await?;

    let text = render_receipt_text(&ReceiptDetails {
        receipt_number: &donation.receipt_number,
        donor_name: &donation.donor_name,
        donor_email: &donation.donor_email,
        campaign_title: campaign
            .as_ref()
            .map(|campaign| campaign.title.as_str())
            .unwrap_or("General Fund"),
        amount: donation.amount,
        created_at: donation.created_at,
    });

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(receipt_file_name(
                &donation.receipt_number,
            ))],
        })
        .body(text))
}
