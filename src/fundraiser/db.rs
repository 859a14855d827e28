use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson};
use mongodb::options::FindOptions;

use crate::campaign::CampaignId;
use crate::database::MongoFundraiserRequestStore;
use crate::error::Error;

use super::{FundraiserRequest, FundraiserRequestId, RequestStatus};

#[async_trait]
pub trait FundraiserRequestStore: Send + Sync {
    async fn insert_request(&self, request: &FundraiserRequest) -> Result<(), Error>;

    async fn fetch_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<FundraiserRequest>, Error>;

    async fn fetch_request_by_id(
        &self,
        request_id: FundraiserRequestId,
    ) -> Result<Option<FundraiserRequest>, Error>;

    /// Moves the request to `status` only if it is still in the status it was
    /// read with; otherwise another writer got there first.
    async fn update_request_status(
        &self,
        request: FundraiserRequest,
        status: RequestStatus,
        campaign_id: Option<CampaignId>,
    ) -> Result<FundraiserRequest, Error>;
}

#[async_trait]
impl FundraiserRequestStore for MongoFundraiserRequestStore {
    #[tracing::instrument(skip(self))]
    async fn insert_request(&self, request: &FundraiserRequest) -> Result<(), Error> {
        self.insert_one(request, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<FundraiserRequest>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let filter = match status {
            Some(status) => bson::doc! { "status": status.as_str() },
            None => bson::doc! {},
        };

        let requests: Vec<FundraiserRequest> =
            self.find(filter, options).await?.try_collect().await?;

        Ok(requests)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_request_by_id(
        &self,
        request_id: FundraiserRequestId,
    ) -> Result<Option<FundraiserRequest>, Error> {
        let request: Option<FundraiserRequest> = self
            .find_one(bson::doc! { "_id": request_id }, None)
            .await?;

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    async fn update_request_status(
        &self,
        mut request: FundraiserRequest,
        status: RequestStatus,
        campaign_id: Option<CampaignId>,
    ) -> Result<FundraiserRequest, Error> {
        let now = Utc::now();
        let new_modified_at = bson::DateTime::from_chrono(now);
        let new_campaign_id = campaign_id.map(Bson::from).unwrap_or(Bson::Null);

        let result = self
            .update_one(
                bson::doc! { "_id": request.id, "status": request.status.as_str() },
                bson::doc! {
                    "$set": {
                        "status": status.as_str(),
                        "campaign_id": new_campaign_id,
                        "modified_at": new_modified_at,
                    }
                },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        request.status = status;
        request.campaign_id = campaign_id;
        request.modified_at = now;

        Ok(request)
    }
}
