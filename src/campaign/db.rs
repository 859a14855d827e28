use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::database::MongoCampaignStore;
use crate::error::Error;

use super::{Campaign, CampaignId};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_active_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(&self, campaign_id: CampaignId)
        -> Result<Option<Campaign>, Error>;

    async fn increment_amount_raised(
        &self,
        campaign_id: CampaignId,
        amount: f64,
    ) -> Result<(), Error>;

    async fn count_campaigns(&self) -> Result<u64, Error>;
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_active_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! { "is_active": true }, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_amount_raised(
        &self,
        campaign_id: CampaignId,
        amount: f64,
    ) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());

        let result = self
            .update_one(
                bson::doc! { "_id": campaign_id },
                bson::doc! {
                    "$inc": { "amount_raised": amount },
                    "$set": { "modified_at": now },
                },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::CampaignNotFound { campaign_id });
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn count_campaigns(&self) -> Result<u64, Error> {
        let count = self.count_documents(bson::doc! {}, None).await?;

        Ok(count)
    }
}
