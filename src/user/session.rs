//! Request extractors for authenticated routes.
//!
//! Handlers take [`CurrentUser`] when any signed-in account will do, and
//! [`AdminUser`] for `/admin` routes. `Option<CurrentUser>` makes sign-in
//! optional.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use tracing::warn;

use crate::database::Database;
use crate::error::Error;

use super::{manager, Session, SessionToken, User};

#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

#[derive(Clone, Debug)]
pub struct AdminUser(pub CurrentUser);

fn bearer_token(req: &HttpRequest) -> Option<SessionToken> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(SessionToken::from(token.to_string()))
    }
}

fn database(req: &HttpRequest) -> Result<Data<Box<dyn Database>>, Error> {
    req.app_data::<Data<Box<dyn Database>>>()
        .cloned()
        .ok_or_else(|| Error::ExistentialState("no database registered with the app".into()))
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<CurrentUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let db = database(req);

        Box::pin(async move {
            let token = token.ok_or(Error::AuthenticationRequired)?;
            let db = db?;

            manager::authenticate(&***db, token).await
        })
    }
}

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<AdminUser, Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);
        let db = database(req);

        Box::pin(async move {
            let current = current.await?;
            let db = db?;

            if !manager::is_admin(&***db, current.user.id).await? {
                warn!(user_id = %current.user.id, "non-admin attempted an admin route");
                return Err(Error::AdminAccessRequired);
            }

            Ok(AdminUser(current))
        })
    }
}
