use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::database::Database;
use crate::donation::Donation;
use crate::error::Error;
use crate::monthly::MonthlyDonation;
use crate::violations::{non_empty, Violations};

use super::password::{hash_password, verify_password};
use super::session::CurrentUser;
use super::{normalize_email, Profile, Role, Session, SessionToken, User, UserId};

const RECENT_DONATION_LIMIT: usize = 5;

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

// passwords never reach the logs
impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish()
    }
}

impl std::fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Account {
    pub user: User,
    pub profile: Option<Profile>,
    pub is_admin: bool,
}

#[derive(Clone, Debug)]
pub struct DonationSummary {
    pub profile: Option<Profile>,
    pub recent_donations: Vec<Donation>,
    pub recent_monthly_donations: Vec<MonthlyDonation>,
    pub total_donated: f64,
}

async fn start_session(
    db: &dyn Database,
    user_id: UserId,
    session_ttl: Duration,
) -> Result<Session, Error> {
    let now = Utc::now();
    let session = Session {
        token: SessionToken::generate(),
        user_id,
        created_at: now,
        expires_at: now + session_ttl,
    };

    db.sessions().insert_session(&session).await?;

    Ok(session)
}

async fn create_account(
    db: &dyn Database,
    email: String,
    password: &str,
    full_name: Option<String>,
    phone: Option<String>,
) -> Result<(User, Profile), Error> {
    if db.users().fetch_user_by_email(&email).await?.is_some() {
        return Err(Error::EmailAlreadyRegistered { email });
    }

    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        email,
        password_hash: hash_password(password)?,
        created_at: now,
        modified_at: now,
    };

    db.users().insert_user(&user).await?;

    let profile = Profile {
        user_id: user.id,
        full_name,
        phone,
        created_at: now,
        modified_at: now,
    };

    // an account without a profile would block a retry with the same email
    if let Err(err) = db.profiles().insert_profile(&profile).await {
        if let Err(delete_err) = db.users().delete_user(user.id).await {
            error!(
                user_id = %user.id,
                "failed to remove account after profile insert failed: {}",
                delete_err
            );
        }
        return Err(err);
    }

    Ok((user, profile))
}

#[tracing::instrument(skip(db))]
pub async fn sign_up(
    db: &dyn Database,
    form: SignUpForm,
    session_ttl: Duration,
) -> Result<(User, Profile, Session), Error> {
    let mut violations = Violations::new();
    violations.require_email("email", &form.email);
    violations.require_password(&form.password);
    violations.require_text("full_name", &form.full_name);
    violations.into_result()?;

    let email = normalize_email(&form.email);
    let full_name = non_empty(Some(form.full_name));
    let phone = non_empty(form.phone);

    let (user, profile) = create_account(db, email, &form.password, full_name, phone).await?;
    let session = start_session(db, user.id, session_ttl).await?;

    info!(user_id = %user.id, "account created");

    Ok((user, profile, session))
}

#[tracing::instrument(skip(db))]
pub async fn sign_in(
    db: &dyn Database,
    form: SignInForm,
    session_ttl: Duration,
) -> Result<(User, Session), Error> {
    let mut violations = Violations::new();
    violations.require_text("email", &form.email);
    violations.require_text("password", &form.password);
    violations.into_result()?;

    let email = normalize_email(&form.email);
    let user = db
        .users()
        .fetch_user_by_email(&email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(Error::InvalidCredentials);
    }

    let session = start_session(db, user.id, session_ttl).await?;

    Ok((user, session))
}

/// Signs in, then insists on the admin role. A non-admin is signed straight
/// back out so the session it just received is useless.
#[tracing::instrument(skip(db))]
pub async fn sign_in_admin(
    db: &dyn Database,
    form: SignInForm,
    session_ttl: Duration,
) -> Result<(User, Session), Error> {
    let (user, session) = sign_in(db, form, session_ttl).await?;

    if !is_admin(db, user.id).await? {
        warn!(user_id = %user.id, "admin sign-in refused for non-admin account");
        db.sessions().delete_session(&session.token).await?;
        return Err(Error::AdminAccessRequired);
    }

    Ok((user, session))
}

#[tracing::instrument(skip(db))]
pub async fn sign_out(db: &dyn Database, session: &Session) -> Result<(), Error> {
    db.sessions().delete_session(&session.token).await
}

/// Resolves a bearer token to its user. Expired sessions are removed as they
/// are found.
#[tracing::instrument(skip(db))]
pub async fn authenticate(db: &dyn Database, token: SessionToken) -> Result<CurrentUser, Error> {
    let session = db
        .sessions()
        .fetch_session(&token)
        .await?
        .ok_or(Error::AuthenticationRequired)?;

    if session.is_expired(Utc::now()) {
        if let Err(err) = db.sessions().delete_session(&session.token).await {
            warn!("failed to remove expired session: {}", err);
        }
        return Err(Error::SessionExpired);
    }

    let user = db
        .users()
        .fetch_user_by_id(session.user_id)
        .await?
        .ok_or(Error::AuthenticationRequired)?;

    Ok(CurrentUser { user, session })
}

pub async fn is_admin(db: &dyn Database, user_id: UserId) -> Result<bool, Error> {
    db.user_roles().has_role(user_id, Role::Admin).await
}

#[tracing::instrument(skip(db))]
pub async fn get_account(db: &dyn Database, user: User) -> Result<Account, Error> {
    let profile = db.profiles().fetch_profile(user.id).await?;
    let is_admin = is_admin(db, user.id).await?;

    Ok(Account {
        user,
        profile,
        is_admin,
    })
}

/// The signed-in donor's recent giving.
///
/// `total_donated` is lifetime giving: it sums every donation and monthly
/// pledge on the account, so it is usually larger than the sum of the five
/// recent entries of each kind returned alongside it.
#[tracing::instrument(skip(db))]
pub async fn get_donation_summary(
    db: &dyn Database,
    user_id: UserId,
) -> Result<DonationSummary, Error> {
    let profile = db.profiles().fetch_profile(user_id).await?;
    let mut donations = db.donations().fetch_donations_by_user(user_id).await?;
    let mut monthly_donations = db
        .monthly_donations()
        .fetch_monthly_donations_by_user(user_id)
        .await?;

    let total_donated = donations.iter().map(|d| d.amount).sum::<f64>()
        + monthly_donations.iter().map(|d| d.amount).sum::<f64>();

    donations.truncate(RECENT_DONATION_LIMIT);
    monthly_donations.truncate(RECENT_DONATION_LIMIT);

    Ok(DonationSummary {
        profile,
        recent_donations: donations,
        recent_monthly_donations: monthly_donations,
        total_donated,
    })
}

#[tracing::instrument(skip(db))]
pub async fn grant_admin_role(db: &dyn Database, user_id: UserId) -> Result<(), Error> {
    db.users()
        .fetch_user_by_id(user_id)
        .await?
        .ok_or(Error::UserNotFound { user_id })?;

    db.user_roles().grant_role(user_id, Role::Admin).await?;

    info!(user_id = %user_id, "admin role granted");

    Ok(())
}

/// Makes sure an account with `email` exists and holds the admin role,
/// creating it with `password` if needed. An existing account keeps its
/// password.
#[tracing::instrument(skip(db, password))]
pub async fn ensure_admin_account(
    db: &dyn Database,
    email: &str,
    password: &str,
) -> Result<UserId, Error> {
    let email = normalize_email(email);

    let user_id = match db.users().fetch_user_by_email(&email).await? {
        Some(user) => user.id,
        None => {
            let (user, _) = create_account(
                db,
                email,
                password,
                Some("Administrator".to_string()),
                None,
            )
            .await?;
            user.id
        }
    };

    db.user_roles().grant_role(user_id, Role::Admin).await?;

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test::MockDatabase;
    use crate::violations::Violation;
    use std::sync::{Arc, Mutex};

    fn user_with_password(email: &str, password: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: email.into(),
            password_hash: hash_password(password).unwrap(),
            created_at: now,
            modified_at: now,
        }
    }

    fn session(user_id: UserId, expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            token: SessionToken::generate(),
            user_id,
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    fn sign_in_form() -> SignInForm {
        SignInForm {
            email: "Asha@Example.org".into(),
            password: "correct-horse".into(),
        }
    }

    #[tokio::test]
    async fn sign_up_creates_user_profile_and_session() {
        let mut db = MockDatabase::new();
        let users = Arc::new(Mutex::new(vec![]));
        let users_clone = Arc::clone(&users);
        let profiles = Arc::new(Mutex::new(vec![]));
        let profiles_clone = Arc::clone(&profiles);
        db.users.on_fetch_user_by_email = Box::new(|_| Ok(None));
        db.users.on_insert_user = Box::new(move |user| {
            users_clone.lock().unwrap().push(user.clone());
            Ok(())
        });
        db.profiles.on_insert_profile = Box::new(move |profile| {
            profiles_clone.lock().unwrap().push(profile.clone());
            Ok(())
        });
        db.sessions.on_insert_session = Box::new(|_| Ok(()));
        let form = SignUpForm {
            email: " Asha@Example.org ".into(),
            password: "correct-horse".into(),
            full_name: "Asha Verma".into(),
            phone: Some("".into()),
        };

        let (user, profile, session) = sign_up(&db, form, Duration::hours(1)).await.unwrap();

        assert_eq!(user.email, "asha@example.org");
        assert!(verify_password("correct-horse", &user.password_hash).unwrap());
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.full_name, Some("Asha Verma".into()));
        assert_eq!(profile.phone, None);
        assert_eq!(session.user_id, user.id);
        assert_eq!(users.lock().unwrap().len(), 1);
        assert_eq!(profiles.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sign_up_with_a_taken_email_is_a_conflict() {
        let mut db = MockDatabase::new();
        db.users.on_fetch_user_by_email =
            Box::new(|email| Ok(Some(user_with_password(email, "whatever"))));
        let form = SignUpForm {
            email: "asha@example.org".into(),
            password: "correct-horse".into(),
            full_name: "Asha Verma".into(),
            phone: None,
        };

        let result = sign_up(&db, form, Duration::hours(1)).await;

        assert_eq!(
            result.unwrap_err(),
            Error::EmailAlreadyRegistered {
                email: "asha@example.org".into()
            }
        );
    }

    #[tokio::test]
    async fn failed_profile_insert_removes_the_new_account() {
        let mut db = MockDatabase::new();
        let inserted = Arc::new(Mutex::new(vec![]));
        let inserted_clone = Arc::clone(&inserted);
        let deleted = Arc::new(Mutex::new(vec![]));
        let deleted_clone = Arc::clone(&deleted);
        db.users.on_fetch_user_by_email = Box::new(|_| Ok(None));
        db.users.on_insert_user = Box::new(move |user| {
            inserted_clone.lock().unwrap().push(user.id);
            Ok(())
        });
        db.profiles.on_insert_profile =
            Box::new(|_| Err(Error::ExistentialState("insert failed".into())));
        db.users.on_delete_user = Box::new(move |user_id| {
            deleted_clone.lock().unwrap().push(user_id);
            Ok(())
        });
        let form = SignUpForm {
            email: "asha@example.org".into(),
            password: "correct-horse".into(),
            full_name: "Asha Verma".into(),
            phone: None,
        };

        let result = sign_up(&db, form, Duration::hours(1)).await;

        assert_eq!(
            result.unwrap_err(),
            Error::ExistentialState("insert failed".into())
        );
        assert_eq!(*deleted.lock().unwrap(), *inserted.lock().unwrap());
        assert_eq!(deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sign_up_rejects_short_passwords_and_missing_names() {
        let db = MockDatabase::new();
        let form = SignUpForm {
            email: "asha@example.org".into(),
            password: "abc".into(),
            full_name: " ".into(),
            phone: None,
        };

        let result = sign_up(&db, form, Duration::hours(1)).await;

        assert_eq!(
            result.unwrap_err(),
            Error::RequestViolatesRules {
                violations: vec![
                    Violation::PasswordTooShort { minimum_length: 6 },
                    Violation::MissingField { field: "full_name" },
                ]
            }
        );
    }

    #[tokio::test]
    async fn sign_in_matches_email_case_insensitively() {
        let mut db = MockDatabase::new();
        let looked_up = Arc::new(Mutex::new(vec![]));
        let looked_up_clone = Arc::clone(&looked_up);
        db.users.on_fetch_user_by_email = Box::new(move |email| {
            looked_up_clone.lock().unwrap().push(email.to_string());
            Ok(Some(user_with_password(email, "correct-horse")))
        });
        db.sessions.on_insert_session = Box::new(|_| Ok(()));

        let (user, session) = sign_in(&db, sign_in_form(), Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(*looked_up.lock().unwrap(), vec!["asha@example.org".to_string()]);
        assert_eq!(session.user_id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let mut db = MockDatabase::new();
        db.users.on_fetch_user_by_email =
            Box::new(|email| Ok(Some(user_with_password(email, "other-password"))));
        let wrong_password = sign_in(&db, sign_in_form(), Duration::hours(1)).await;

        let mut db = MockDatabase::new();
        db.users.on_fetch_user_by_email = Box::new(|_| Ok(None));
        let unknown_email = sign_in(&db, sign_in_form(), Duration::hours(1)).await;

        assert_eq!(wrong_password.unwrap_err(), Error::InvalidCredentials);
        assert_eq!(unknown_email.unwrap_err(), Error::InvalidCredentials);
    }

    #[tokio::test]
    async fn admin_sign_in_by_non_admin_deletes_the_session() {
        let mut db = MockDatabase::new();
        let inserted = Arc::new(Mutex::new(vec![]));
        let inserted_clone = Arc::clone(&inserted);
        let deleted = Arc::new(Mutex::new(vec![]));
        let deleted_clone = Arc::clone(&deleted);
        db.users.on_fetch_user_by_email =
            Box::new(|email| Ok(Some(user_with_password(email, "correct-horse"))));
        db.sessions.on_insert_session = Box::new(move |session| {
            inserted_clone.lock().unwrap().push(session.token.clone());
            Ok(())
        });
        db.user_roles.on_has_role = Box::new(|_, _| Ok(false));
        db.sessions.on_delete_session = Box::new(move |token| {
            deleted_clone.lock().unwrap().push(token.clone());
            Ok(())
        });

        let result = sign_in_admin(&db, sign_in_form(), Duration::hours(1)).await;

        assert_eq!(result.unwrap_err(), Error::AdminAccessRequired);
        assert_eq!(*deleted.lock().unwrap(), *inserted.lock().unwrap());
        assert_eq!(deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn admin_sign_in_by_admin_keeps_the_session() {
        let mut db = MockDatabase::new();
        db.users.on_fetch_user_by_email =
            Box::new(|email| Ok(Some(user_with_password(email, "correct-horse"))));
        db.sessions.on_insert_session = Box::new(|_| Ok(()));
        db.user_roles.on_has_role = Box::new(|_, role| Ok(role == Role::Admin));

        let result = sign_in_admin(&db, sign_in_form(), Duration::hours(1)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn expired_sessions_are_removed_and_rejected() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        let expired = session(user_id, Duration::minutes(-5));
        let token = expired.token.clone();
        let deleted = Arc::new(Mutex::new(vec![]));
        let deleted_clone = Arc::clone(&deleted);
        db.sessions.on_fetch_session = Box::new(move |_| Ok(Some(expired.clone())));
        db.sessions.on_delete_session = Box::new(move |token| {
            deleted_clone.lock().unwrap().push(token.clone());
            Ok(())
        });

        let result = authenticate(&db, token.clone()).await;

        assert_eq!(result.unwrap_err(), Error::SessionExpired);
        assert_eq!(*deleted.lock().unwrap(), vec![token]);
    }

    #[tokio::test]
    async fn unknown_tokens_require_authentication() {
        let mut db = MockDatabase::new();
        db.sessions.on_fetch_session = Box::new(|_| Ok(None));

        let result = authenticate(&db, SessionToken::generate()).await;

        assert_eq!(result.unwrap_err(), Error::AuthenticationRequired);
    }

    #[tokio::test]
    async fn donation_summary_totals_everything_but_lists_five() {
        use crate::campaign::CampaignId;
        use crate::donation::DonationId;
        use crate::monthly::MonthlyDonationId;

        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        db.profiles.on_fetch_profile = Box::new(|_| Ok(None));
        db.donations.on_fetch_donations_by_user = Box::new(|user_id| {
            Ok((0..7)
                .map(|i| Donation {
                    id: DonationId::new(),
                    campaign_id: CampaignId::new(),
                    donor_name: "Asha Verma".into(),
                    donor_email: "asha@example.org".into(),
                    donor_phone: None,
                    amount: 100.0 * (i + 1) as f64,
                    message: None,
                    receipt_number: format!("RCP-20260101-AAAAAAA{}", i),
                    user_id: Some(user_id),
                    created_at: Utc::now(),
                })
                .collect())
        });
        db.monthly_donations.on_fetch_monthly_donations_by_user = Box::new(|user_id| {
            Ok(vec![MonthlyDonation {
                id: MonthlyDonationId::new(),
                donor_name: "Asha Verma".into(),
                donor_email: "asha@example.org".into(),
                donor_phone: None,
                amount: 1000.0,
                plan_id: "hunger".into(),
                plan_name: "Support To Fill A Plate".into(),
                is_indian_citizen: true,
                receipt_number: "RCP-20260101-BBBBBBBB".into(),
                user_id,
                created_at: Utc::now(),
            }])
        });

        let summary = get_donation_summary(&db, user_id).await.unwrap();

        assert_eq!(summary.recent_donations.len(), 5);
        assert_eq!(summary.recent_monthly_donations.len(), 1);
        assert_eq!(summary.total_donated, 2800.0 + 1000.0);
        let listed: f64 = summary.recent_donations.iter().map(|d| d.amount).sum::<f64>()
            + summary
                .recent_monthly_donations
                .iter()
                .map(|m| m.amount)
                .sum::<f64>();
        assert!(summary.total_donated > listed);
    }

    #[tokio::test]
    async fn granting_admin_to_unknown_user_is_not_found() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        db.users.on_fetch_user_by_id = Box::new(|_| Ok(None));

        let result = grant_admin_role(&db, user_id).await;

        assert_eq!(result.unwrap_err(), Error::UserNotFound { user_id });
    }

    #[tokio::test]
    async fn existing_admin_account_is_left_alone() {
        let mut db = MockDatabase::new();
        let existing = user_with_password("root@sewa.org", "old-password");
        let existing_id = existing.id;
        let granted = Arc::new(Mutex::new(vec![]));
        let granted_clone = Arc::clone(&granted);
        db.users.on_fetch_user_by_email = Box::new(move |_| Ok(Some(existing.clone())));
        db.user_roles.on_grant_role = Box::new(move |user_id, role| {
            granted_clone.lock().unwrap().push((user_id, role));
            Ok(())
        });

        let user_id = ensure_admin_account(&db, "Root@Sewa.org", "new-password")
            .await
            .unwrap();

        assert_eq!(user_id, existing_id);
        assert_eq!(*granted.lock().unwrap(), vec![(existing_id, Role::Admin)]);
    }
}
