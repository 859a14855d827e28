use chrono::Utc;
use serde::Deserialize;

use crate::database::Database;
use crate::donation::receipt::generate_receipt_number;
use crate::error::Error;
use crate::user::User;
use crate::violations::{non_empty, Violation, Violations};

use super::{find_plan, MonthlyDonation, MonthlyDonationId};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MonthlyDonationForm {
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub donor_phone: Option<String>,
    pub amount: Option<f64>,
    pub plan_id: String,
    pub is_indian_citizen: Option<bool>,
}

/// Records a monthly pledge for the signed-in user. Contact fields left blank
/// are filled from the user's profile and account email.
#[tracing::instrument(skip(db))]
pub async fn pledge_monthly_donation(
    db: &dyn Database,
    user: &User,
    form: MonthlyDonationForm,
) -> Result<MonthlyDonation, Error> {
    let mut donor_name = non_empty(form.donor_name);
    let mut donor_phone = non_empty(form.donor_phone);
    let donor_email = non_empty(form.donor_email).unwrap_or_else(|| user.email.clone());

    if donor_name.is_none() || donor_phone.is_none() {
        if let Some(profile) = db.profiles().fetch_profile(user.id).await? {
            donor_name = donor_name.or_else(|| non_empty(profile.full_name));
            donor_phone = donor_phone.or_else(|| non_empty(profile.phone));
        }
    }

    let plan = find_plan(form.plan_id.trim());

    let mut violations = Violations::new();
    violations.require_some("donor_name", &donor_name);
    violations.require_email("donor_email", &donor_email);
    violations.require_some("donor_phone", &donor_phone);
    violations.require_positive_amount("amount", form.amount);
    if plan.is_none() {
        violations.push(Violation::UnknownMonthlyPlan {
            plan_id: form.plan_id.clone(),
        });
    }
    violations.into_result()?;

    let (donor_name, plan, amount) = match (donor_name, plan, form.amount) {
        (Some(donor_name), Some(plan), Some(amount)) => (donor_name, plan, amount),
        _ => {
            return Err(Error::ExistentialState(
                "validated monthly donation is incomplete".into(),
            ))
        }
    };

    let now = Utc::now();
    let donation = MonthlyDonation {
        id: MonthlyDonationId::new(),
        donor_name,
        donor_email,
        donor_phone,
        amount,
        plan_id: plan.id.to_string(),
        plan_name: plan.name.to_string(),
        is_indian_citizen: form.is_indian_citizen.unwrap_or(true),
        receipt_number: generate_receipt_number(now),
        user_id: user.id,
        created_at: now,
    };

    db.monthly_donations()
        .insert_monthly_donation(&donation)
        .await?;

    Ok(donation)
}
