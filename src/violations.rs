use serde::Serialize;

use crate::error::Error;

pub const MINIMUM_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Violation {
    MissingField {
        field: &'static str,
    },
    InvalidEmail {
        field: &'static str,
    },
    AmountNotPositive {
        field: &'static str,
    },
    UnknownMonthlyPlan {
        plan_id: String,
    },
    PasswordTooShort {
        minimum_length: usize,
    },
}

/// Collects every problem with a submitted form before anything touches the
/// database, so the caller sees the full list in one response.
#[derive(Debug, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Violations {
        Violations(vec![])
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    /// Empty or whitespace-only text counts as missing.
    pub fn require_text(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(Violation::MissingField { field });
        }
    }

    pub fn require_some<T>(&mut self, field: &'static str, value: &Option<T>) {
        if value.is_none() {
            self.push(Violation::MissingField { field });
        }
    }

    pub fn require_email(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(Violation::MissingField { field });
        } else if !is_plausible_email(value) {
            self.push(Violation::InvalidEmail { field });
        }
    }

    pub fn require_positive_amount(&mut self, field: &'static str, value: Option<f64>) {
        match value {
            None => self.push(Violation::MissingField { field }),
            Some(amount) if !amount.is_finite() || amount <= 0.0 => {
                self.push(Violation::AmountNotPositive { field })
            }
            Some(_) => {}
        }
    }

    pub fn require_password(&mut self, value: &str) {
        if value.is_empty() {
            self.push(Violation::MissingField { field: "password" });
        } else if value.chars().count() < MINIMUM_PASSWORD_LENGTH {
            self.push(Violation::PasswordTooShort {
                minimum_length: MINIMUM_PASSWORD_LENGTH,
            });
        }
    }

    pub fn into_result(self) -> Result<(), Error> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::RequestViolatesRules { violations: self.0 })
        }
    }
}

fn is_plausible_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && domain.contains('.')
        }
        None => false,
    }
}

/// Treats empty or whitespace-only optional form fields as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_violations_is_ok() {
        let mut violations = Violations::new();
        violations.require_text("title", "Clean water");
        violations.require_email("email", "donor@example.org");
        violations.require_positive_amount("amount", Some(500.0));

        assert!(violations.into_result().is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut violations = Violations::new();
        violations.require_text("title", "   ");
        violations.require_email("email", "not-an-email");
        violations.require_positive_amount("amount", Some(-3.0));
        violations.require_positive_amount("goal_amount", None);

        assert_eq!(
            violations.into_result().unwrap_err(),
            Error::RequestViolatesRules {
                violations: vec![
                    Violation::MissingField { field: "title" },
                    Violation::InvalidEmail { field: "email" },
                    Violation::AmountNotPositive { field: "amount" },
                    Violation::MissingField {
                        field: "goal_amount"
                    },
                ]
            }
        );
    }

    #[test]
    fn rejects_non_finite_amounts() {
        let mut violations = Violations::new();
        violations.require_positive_amount("amount", Some(f64::NAN));
        violations.require_positive_amount("amount", Some(f64::INFINITY));

        assert!(violations.into_result().is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        let mut violations = Violations::new();
        violations.require_password("abc");

        assert_eq!(
            violations.into_result().unwrap_err(),
            Error::RequestViolatesRules {
                violations: vec![Violation::PasswordTooShort { minimum_length: 6 }]
            }
        );
    }

    #[test]
    fn blank_optional_fields_become_none() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(
            non_empty(Some(" 98765 ".to_string())),
            Some("98765".to_string())
        );
    }
}
