use std::env;
use std::str::FromStr;

use chrono::Duration;

use crate::error::Error;

const DEFAULT_DATABASE_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE_NAME: &str = "sewa";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_SESSION_TTL_HOURS: i64 = 7 * 24;

/// Runtime settings, read from `SEWA_*` environment variables.
///
/// | Variable                 | Default                     |
/// |--------------------------|-----------------------------|
/// | `SEWA_DATABASE_URI`      | `mongodb://localhost:27017` |
/// | `SEWA_DATABASE_NAME`     | `sewa`                      |
/// | `SEWA_BIND_ADDRESS`      | `127.0.0.1:8080`            |
/// | `SEWA_SESSION_TTL_HOURS` | `168`                       |
/// | `SEWA_SEED_CAMPAIGNS`    | `false`                     |
/// | `SEWA_ADMIN_EMAIL`       | unset                       |
/// | `SEWA_ADMIN_PASSWORD`    | unset                       |
#[derive(Clone, Debug)]
pub struct Config {
    pub database_uri: String,
    pub database_name: String,
    pub bind_address: String,
    pub session_ttl: Duration,
    pub seed_campaigns: bool,
    pub bootstrap_admin: Option<AdminCredentials>,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            database_uri: DEFAULT_DATABASE_URI.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            seed_campaigns: false,
            bootstrap_admin: None,
        }
    }
}

impl Config {
    /// Loads `.env` if one exists, then reads the environment.
    pub fn from_env() -> Result<Config, Error> {
        dotenvy::dotenv().ok();

        Config::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let session_ttl_hours: i64 = parse_or(
            &lookup,
            "SEWA_SESSION_TTL_HOURS",
            DEFAULT_SESSION_TTL_HOURS,
        )?;
        if session_ttl_hours <= 0 {
            return Err(Error::InvalidConfiguration {
                name: "SEWA_SESSION_TTL_HOURS",
                value: session_ttl_hours.to_string(),
            });
        }

        let bootstrap_admin = match (lookup("SEWA_ADMIN_EMAIL"), lookup("SEWA_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminCredentials { email, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::InvalidConfiguration {
                    name: "SEWA_ADMIN_PASSWORD",
                    value: String::new(),
                })
            }
            (None, Some(_)) => {
                return Err(Error::InvalidConfiguration {
                    name: "SEWA_ADMIN_EMAIL",
                    value: String::new(),
                })
            }
        };

        Ok(Config {
            database_uri: lookup("SEWA_DATABASE_URI").unwrap_or(defaults.database_uri),
            database_name: lookup("SEWA_DATABASE_NAME").unwrap_or(defaults.database_name),
            bind_address: lookup("SEWA_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            session_ttl: Duration::hours(session_ttl_hours),
            seed_campaigns: parse_or(&lookup, "SEWA_SEED_CAMPAIGNS", defaults.seed_campaigns)?,
            bootstrap_admin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfiguration { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.database_uri, "mongodb://localhost:27017");
        assert_eq!(config.database_name, "sewa");
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.session_ttl, Duration::hours(168));
        assert!(!config.seed_campaigns);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SEWA_DATABASE_NAME", "sewa_test"),
            ("SEWA_SESSION_TTL_HOURS", "2"),
            ("SEWA_SEED_CAMPAIGNS", "true"),
            ("SEWA_ADMIN_EMAIL", "admin@sacchisewa.org"),
            ("SEWA_ADMIN_PASSWORD", "hunter22"),
        ]))
        .unwrap();

        assert_eq!(config.database_name, "sewa_test");
        assert_eq!(config.session_ttl, Duration::hours(2));
        assert!(config.seed_campaigns);
        assert_eq!(
            config.bootstrap_admin.unwrap().email,
            "admin@sacchisewa.org".to_string()
        );
    }

    #[test]
    fn rejects_unparsable_values() {
        let result = Config::from_lookup(lookup_from(&[("SEWA_SESSION_TTL_HOURS", "soon")]));

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidConfiguration {
                name: "SEWA_SESSION_TTL_HOURS",
                value: "soon".into(),
            }
        );
    }

    #[test]
    fn admin_email_requires_a_password() {
        let result = Config::from_lookup(lookup_from(&[("SEWA_ADMIN_EMAIL", "a@b.org")]));

        assert!(result.is_err());
    }
}
