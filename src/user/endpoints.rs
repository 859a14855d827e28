use actix_web::web::{Data, Json, Path};
use actix_web::{get, post, put, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::config::Config;
use crate::database::Database;
use crate::donation::{Donation, DonationId};
use crate::error::Error;
use crate::monthly::MonthlyDonationBody;

use super::manager::{self, Account, DonationSummary, SignInForm, SignUpForm};
use super::session::{AdminUser, CurrentUser};
use super::{Profile, Session, User, UserId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountBody {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
}

impl AccountBody {
    pub fn render(account: Account) -> AccountBody {
        let (full_name, phone) = match account.profile {
            Some(profile) => (profile.full_name, profile.phone),
            None => (None, None),
        };

        AccountBody {
            id: account.user.id,
            email: account.user.email,
            full_name,
            phone,
            is_admin: account.is_admin,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionBody {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: AccountBody,
}

impl SessionBody {
    pub fn render(session: Session, account: Account) -> SessionBody {
        SessionBody {
            token: session.token.as_str().to_string(),
            expires_at: session.expires_at,
            account: AccountBody::render(account),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileBody {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DonationEntryBody {
    pub id: DonationId,
    pub campaign_id: CampaignId,
    pub amount: f64,
    pub receipt_number: String,
    pub created_at: DateTime<Utc>,
}

impl DonationEntryBody {
    pub fn render(donation: Donation) -> DonationEntryBody {
        DonationEntryBody {
            id: donation.id,
            campaign_id: donation.campaign_id,
            amount: donation.amount,
            receipt_number: donation.receipt_number,
            created_at: donation.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DonationSummaryBody {
    pub profile: Option<ProfileBody>,
    pub recent_donations: Vec<DonationEntryBody>,
    pub recent_monthly_donations: Vec<MonthlyDonationBody>,
    pub total_donated: f64,
}

impl DonationSummaryBody {
    pub fn render(summary: DonationSummary) -> DonationSummaryBody {
        DonationSummaryBody {
            profile: summary.profile.map(|profile: Profile| ProfileBody {
                full_name: profile.full_name,
                phone: profile.phone,
            }),
            recent_donations: summary
                .recent_donations
                .into_iter()
                .map(DonationEntryBody::render)
                .collect(),
            recent_monthly_donations: summary
                .recent_monthly_donations
                .into_iter()
                .map(MonthlyDonationBody::render)
                .collect(),
            total_donated: summary.total_donated,
        }
    }
}

async fn session_body(
    db: &dyn Database,
    user: User,
    session: Session,
) -> Result<SessionBody, Error> {
    let account = manager::get_account(db, user).await?;

    Ok(SessionBody::render(session, account))
}

#[post("/auth/signup")]
#[tracing::instrument(skip(db, config))]
pub async fn sign_up(
    db: Data<Box<dyn Database>>,
    config: Data<Config>,
    body: Json<SignUpForm>,
) -> Result<Json<SessionBody>, Error> {
    let (user, profile, session) =
        manager::sign_up(&***db, body.into_inner(), config.session_ttl).await?;

    let account = Account {
        user,
        profile: Some(profile),
        is_admin: false,
    };

    Ok(Json(SessionBody::render(session, account)))
}

#[post("/auth/signin")]
#[tracing::instrument(skip(db, config))]
pub async fn sign_in(
    db: Data<Box<dyn Database>>,
    config: Data<Config>,
    body: Json<SignInForm>,
) -> Result<Json<SessionBody>, Error> {
    let (user, session) = manager::sign_in(&***db, body.into_inner(), config.session_ttl).await?;

    Ok(Json(session_body(&***db, user, session).await?))
}

#[post("/auth/admin/signin")]
#[tracing::instrument(skip(db, config))]
pub async fn sign_in_admin(
    db: Data<Box<dyn Database>>,
    config: Data<Config>,
    body: Json<SignInForm>,
) -> Result<Json<SessionBody>, Error> {
    let (user, session) =
        manager::sign_in_admin(&***db, body.into_inner(), config.session_ttl).await?;

    Ok(Json(session_body(&***db, user, session).await?))
}

#[post("/auth/signout")]
#[tracing::instrument(skip(db))]
pub async fn sign_out(
    db: Data<Box<dyn Database>>,
    current: CurrentUser,
) -> Result<HttpResponse, Error> {
    manager::sign_out(&***db, &current.session).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/auth/session")]
#[tracing::instrument(skip(db))]
pub async fn get_session(
    db: Data<Box<dyn Database>>,
    current: CurrentUser,
) -> Result<Json<AccountBody>, Error> {
    let account = manager::get_account(&***db, current.user).await?;

    Ok(Json(AccountBody::render(account)))
}

#[get("/me/donations")]
#[tracing::instrument(skip(db))]
pub async fn get_my_donations(
    db: Data<Box<dyn Database>>,
    current: CurrentUser,
) -> Result<Json<DonationSummaryBody>, Error> {
    let summary = manager::get_donation_summary(&***db, current.user.id).await?;

    Ok(Json(DonationSummaryBody::render(summary)))
}

#[put("/admin/users/{user_id}/roles/admin")]
#[tracing::instrument(skip(db))]
pub async fn grant_admin_role(
    db: Data<Box<dyn Database>>,
    _admin: AdminUser,
    params: Path<UserId>,
) -> Result<HttpResponse, Error> {
    let user_id = params.into_inner();
    manager::grant_admin_role(&***db, user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use chrono::Duration;

    use super::*;
    use crate::database::test::MockDatabase;
    use crate::user::password::hash_password;
    use crate::user::Role;

    fn user(user_id: UserId) -> User {
        let now = Utc::now();
        User {
            id: user_id,
            email: "asha@example.org".into(),
            password_hash: "$argon2id$placeholder".into(),
            created_at: now,
            modified_at: now,
        }
    }

    fn signed_in_db(user_id: UserId, is_admin: bool) -> MockDatabase {
        let mut db = MockDatabase::new();
        db.sessions.on_fetch_session = Box::new(move |token| {
            let now = Utc::now();
            Ok(Some(Session {
                token: token.clone(),
                user_id,
                created_at: now,
                expires_at: now + Duration::hours(1),
            }))
        });
        db.users.on_fetch_user_by_id = Box::new(|user_id| Ok(Some(user(user_id))));
        db.user_roles.on_has_role = Box::new(move |_, role| Ok(is_admin && role == Role::Admin));
        db
    }

    #[actix_web::test]
    async fn session_reports_profile_and_admin_flag() {
        let user_id = UserId::new();
        let mut db = signed_in_db(user_id, true);
        db.profiles.on_fetch_profile = Box::new(|user_id| {
            let now = Utc::now();
            Ok(Some(Profile {
                user_id,
                full_name: Some("Asha Verma".into()),
                phone: None,
                created_at: now,
                modified_at: now,
            }))
        });
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Box::new(db) as Box<dyn Database>))
                .app_data(Data::new(Config::default()))
                .configure(crate::configure),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/auth/session")
            .insert_header((header::AUTHORIZATION, "Bearer token-1"))
            .to_request();
        let body: AccountBody = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body.id, user_id);
        assert_eq!(body.full_name, Some("Asha Verma".into()));
        assert!(body.is_admin);
    }

    #[actix_web::test]
    async fn non_admins_cannot_grant_roles() {
        let db = signed_in_db(UserId::new(), false);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Box::new(db) as Box<dyn Database>))
                .app_data(Data::new(Config::default()))
                .configure(crate::configure),
        )
        .await;

        let request = test::TestRequest::put()
            .uri(&format!("/admin/users/{}/roles/admin", UserId::new()))
            .insert_header((header::AUTHORIZATION, "Bearer token-1"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn sign_in_returns_a_bearer_token() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        let password_hash = hash_password("correct-horse").unwrap();
        db.users.on_fetch_user_by_email = Box::new(move |email| {
            let now = Utc::now();
            Ok(Some(User {
                id: user_id,
                email: email.to_string(),
                password_hash: password_hash.clone(),
                created_at: now,
                modified_at: now,
            }))
        });
        db.sessions.on_insert_session = Box::new(|_| Ok(()));
        db.profiles.on_fetch_profile = Box::new(|_| Ok(None));
        db.user_roles.on_has_role = Box::new(|_, _| Ok(false));
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Box::new(db) as Box<dyn Database>))
                .app_data(Data::new(Config::default()))
                .configure(crate::configure),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/auth/signin")
            .set_json(serde_json::json!({
                "email": "asha@example.org",
                "password": "correct-horse",
            }))
            .to_request();
        let body: SessionBody = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body.token.len(), 48);
        assert_eq!(body.account.id, user_id);
        assert!(!body.account.is_admin);
        assert!(body.expires_at > Utc::now());
    }
}
