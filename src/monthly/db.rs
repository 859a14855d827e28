use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::database::MongoMonthlyDonationStore;
use crate::error::Error;
use crate::user::UserId;

use super::MonthlyDonation;

#[async_trait]
pub trait MonthlyDonationStore: Send + Sync {
    async fn insert_monthly_donation(&self, donation: &MonthlyDonation) -> Result<(), Error>;

    /// Newest first.
    async fn fetch_monthly_donations_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MonthlyDonation>, Error>;
}

#[async_trait]
impl MonthlyDonationStore for MongoMonthlyDonationStore {
    #[tracing::instrument(skip(self))]
    async fn insert_monthly_donation(&self, donation: &MonthlyDonation) -> Result<(), Error> {
        self.insert_one(donation, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_monthly_donations_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MonthlyDonation>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let donations: Vec<MonthlyDonation> = self
            .find(bson::doc! { "user_id": user_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(donations)
    }
}
