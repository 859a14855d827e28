use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::database::MongoDonationStore;
use crate::error::Error;
use crate::user::UserId;

use super::Donation;

#[async_trait]
pub trait DonationStore: Send + Sync {
    async fn insert_donation(&self, donation: &Donation) -> Result<(), Error>;

    async fn fetch_donations(&self) -> Result<Vec<Donation>, Error>;

    async fn fetch_donations_by_user(&self, user_id: UserId) -> Result<Vec<Donation>, Error>;

    async fn fetch_donation_by_receipt_number(
        &self,
        receipt_number: &str,
    ) -> Result<Option<Donation>, Error>;
}

#[async_trait]
impl DonationStore for MongoDonationStore {
    #[tracing::instrument(skip(self))]
    async fn insert_donation(&self, donation: &Donation) -> Result<(), Error> {
        self.insert_one(donation, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_donations(&self) -> Result<Vec<Donation>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let donations: Vec<Donation> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(donations)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_donations_by_user(&self, user_id: UserId) -> Result<Vec<Donation>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let donations: Vec<Donation> = self
            .find(bson::doc! { "user_id": user_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(donations)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_donation_by_receipt_number(
        &self,
        receipt_number: &str,
    ) -> Result<Option<Donation>, Error> {
        let donation: Option<Donation> = self
            .find_one(bson::doc! { "receipt_number": receipt_number }, None)
            .await?;

        Ok(donation)
    }
}
