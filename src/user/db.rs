use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson;
use mongodb::options::UpdateOptions;

use crate::database::{
    is_duplicate_key, MongoProfileStore, MongoSessionStore, MongoUserRoleStore, MongoUserStore,
};
use crate::error::Error;

use super::{Profile, Role, Session, SessionToken, User, UserId, UserRoleId};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `EmailAlreadyRegistered` if another account owns the email.
    async fn insert_user(&self, user: &User) -> Result<(), Error>;

    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    async fn delete_user(&self, user_id: UserId) -> Result<(), Error>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), Error>;

    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, Error>;
}

#[async_trait]
pub trait UserRoleStore: Send + Sync {
    /// Granting a role the user already holds is a no-op.
    async fn grant_role(&self, user_id: UserId, role: Role) -> Result<(), Error>;

    async fn has_role(&self, user_id: UserId, role: Role) -> Result<bool, Error>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<(), Error>;

    async fn fetch_session(&self, token: &SessionToken) -> Result<Option<Session>, Error>;

    async fn delete_session(&self, token: &SessionToken) -> Result<(), Error>;
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[tracing::instrument(skip(self))]
    async fn insert_user(&self, user: &User) -> Result<(), Error> {
        match self.insert_one(user, None).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Err(Error::EmailAlreadyRegistered {
                email: user.email.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let user = self.find_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = self.find_one(bson::doc! { "email": email }, None).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, user_id: UserId) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MongoProfileStore {
    #[tracing::instrument(skip(self))]
    async fn insert_profile(&self, profile: &Profile) -> Result<(), Error> {
        self.insert_one(profile, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, Error> {
        let profile = self.find_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(profile)
    }
}

#[async_trait]
impl UserRoleStore for MongoUserRoleStore {
    #[tracing::instrument(skip(self))]
    async fn grant_role(&self, user_id: UserId, role: Role) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let options = UpdateOptions::builder().upsert(true).build();

        self.update_one(
            bson::doc! { "user_id": user_id, "role": role.as_str() },
            bson::doc! {
                "$setOnInsert": {
                    "_id": UserRoleId::new(),
                    "created_at": now,
                }
            },
            options,
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn has_role(&self, user_id: UserId, role: Role) -> Result<bool, Error> {
        let count = self
            .count_documents(
                bson::doc! { "user_id": user_id, "role": role.as_str() },
                None,
            )
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    #[tracing::instrument(skip(self))]
    async fn insert_session(&self, session: &Session) -> Result<(), Error> {
        self.insert_one(session, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_session(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        let session = self
            .find_one(bson::doc! { "_id": token.as_str() }, None)
            .await?;

        Ok(session)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_session(&self, token: &SessionToken) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": token.as_str() }, None)
            .await?;

        Ok(())
    }
}
