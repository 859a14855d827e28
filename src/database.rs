use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use tracing::info;

use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::donation::db::DonationStore;
use crate::donation::Donation;
use crate::error::Error;
use crate::fundraiser::db::FundraiserRequestStore;
use crate::fundraiser::FundraiserRequest;
use crate::monthly::db::MonthlyDonationStore;
use crate::monthly::MonthlyDonation;
use crate::user::db::{ProfileStore, SessionStore, UserRoleStore, UserStore};
use crate::user::{Profile, Session, User, UserRole};

pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoDonationStore = Collection<Donation>;
pub type MongoFundraiserRequestStore = Collection<FundraiserRequest>;
pub type MongoMonthlyDonationStore = Collection<MonthlyDonation>;
pub type MongoUserStore = Collection<User>;
pub type MongoProfileStore = Collection<Profile>;
pub type MongoUserRoleStore = Collection<UserRole>;
pub type MongoSessionStore = Collection<Session>;

const DUPLICATE_KEY_ERROR_CODE: i32 = 11000;

#[async_trait]
pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;

    fn donations(&self) -> &dyn DonationStore;

    fn fundraiser_requests(&self) -> &dyn FundraiserRequestStore;

    fn monthly_donations(&self) -> &dyn MonthlyDonationStore;

    fn users(&self) -> &dyn UserStore;

    fn profiles(&self) -> &dyn ProfileStore;

    fn user_roles(&self) -> &dyn UserRoleStore;

    fn sessions(&self) -> &dyn SessionStore;

    async fn drop(&self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    campaigns: MongoCampaignStore,
    donations: MongoDonationStore,
    fundraiser_requests: MongoFundraiserRequestStore,
    monthly_donations: MongoMonthlyDonationStore,
    users: MongoUserStore,
    profiles: MongoProfileStore,
    user_roles: MongoUserRoleStore,
    sessions: MongoSessionStore,
    db: mongodb::Database,
}

impl MongoDatabase {
    pub fn new(db: mongodb::Database) -> MongoDatabase {
        MongoDatabase {
            campaigns: db.collection("campaigns"),
            donations: db.collection("donations"),
            fundraiser_requests: db.collection("fundraiser_requests"),
            monthly_donations: db.collection("monthly_donations"),
            users: db.collection("users"),
            profiles: db.collection("profiles"),
            user_roles: db.collection("user_roles"),
            sessions: db.collection("sessions"),
            db,
        }
    }

    /// Connects the collections and makes sure the indexes backing the
    /// uniqueness rules exist.
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, Error> {
        let database = MongoDatabase::new(db);

        database
            .campaigns
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "is_active": 1, "created_at": -1 })
                    .build(),
                None,
            )
            .await?;

        database
            .donations
            .create_index(unique_index(doc! { "receipt_number": 1 }), None)
            .await?;
        database
            .donations
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "created_at": -1 })
                    .build(),
                None,
            )
            .await?;

        database
            .monthly_donations
            .create_index(unique_index(doc! { "receipt_number": 1 }), None)
            .await?;

        database
            .fundraiser_requests
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "status": 1, "created_at": -1 })
                    .build(),
                None,
            )
            .await?;

        database
            .users
            .create_index(unique_index(doc! { "email": 1 }), None)
            .await?;

        database
            .user_roles
            .create_index(unique_index(doc! { "user_id": 1, "role": 1 }), None)
            .await?;

        // mongo removes sessions on its own once expires_at has passed
        database
            .sessions
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "expires_at": 1 })
                    .options(
                        IndexOptions::builder()
                            .expire_after(Duration::from_secs(0))
                            .build(),
                    )
                    .build(),
                None,
            )
            .await?;

        info!("database indexes are in place");

        Ok(database)
    }
}

fn unique_index(keys: mongodb::bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_ERROR_CODE
        }
        _ => false,
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn donations(&self) -> &dyn DonationStore {
        &self.donations
    }

    fn fundraiser_requests(&self) -> &dyn FundraiserRequestStore {
        &self.fundraiser_requests
    }

    fn monthly_donations(&self) -> &dyn MonthlyDonationStore {
        &self.monthly_donations
    }

    fn users(&self) -> &dyn UserStore {
        &self.users
    }

    fn profiles(&self) -> &dyn ProfileStore {
        &self.profiles
    }

    fn user_roles(&self) -> &dyn UserRoleStore {
        &self.user_roles
    }

    fn sessions(&self) -> &dyn SessionStore {
        &self.sessions
    }

    async fn drop(&self) -> Result<(), Error> {
        self.db.drop(None).await?;

        Ok(())
    }
}
