use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use argon2::password_hash::Error as PasswordHashError;
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::campaign::CampaignId;
use crate::fundraiser::{FundraiserRequestId, RequestStatus};
use crate::user::UserId;
use crate::violations::Violation;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidForm(#[derivative(PartialEq = "ignore")] UrlencodedError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    RequestViolatesRules {
        violations: Vec<Violation>,
    },

    // 401
    AuthenticationRequired,
    InvalidCredentials,
    SessionExpired,

    // 403
    AdminAccessRequired,

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    FundraiserRequestNotFound {
        request_id: FundraiserRequestId,
    },
    ReceiptNotFound {
        receipt_number: String,
    },
    UserNotFound {
        user_id: UserId,
    },

    // 409
    ConcurrentModificationDetected,
    CampaignIsNotActive {
        campaign_id: CampaignId,
    },
    FundraiserRequestIsNotPending {
        request_id: FundraiserRequestId,
        status: RequestStatus,
    },
    EmailAlreadyRegistered {
        email: String,
    },

    // 500
    ExistentialState(String),
    InvalidConfiguration {
        name: &'static str,
        value: String,
    },
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    FailedToHashPassword(#[derivative(PartialEq = "ignore")] PasswordHashError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidForm(_) => "E4001002",
            Error::InvalidQuery(_) => "E4001003",
            Error::RequestViolatesRules { .. } => "E4001004",
            Error::AuthenticationRequired => "E4011000",
            Error::InvalidCredentials => "E4011001",
            Error::SessionExpired => "E4011002",
            Error::AdminAccessRequired => "E4031000",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::FundraiserRequestNotFound { .. } => "E4041002",
            Error::ReceiptNotFound { .. } => "E4041003",
            Error::UserNotFound { .. } => "E4041004",
            Error::ConcurrentModificationDetected => "E4091000",
            Error::CampaignIsNotActive { .. } => "E4091001",
            Error::FundraiserRequestIsNotPending { .. } => "E4091002",
            Error::EmailAlreadyRegistered { .. } => "E4091003",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToSerializeToBson(_) => "E5001002",
            Error::IoError(_) => "E5001003",
            Error::FailedToHashPassword(_) => "E5001004",
            Error::InvalidConfiguration { .. } => "E5001005",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidForm(_) => "The given form could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::RequestViolatesRules { .. } => "Please fill in all required fields correctly",
            Error::AuthenticationRequired => "Please login to continue",
            Error::InvalidCredentials => "Invalid login credentials",
            Error::SessionExpired => "The session has expired, please login again",
            Error::AdminAccessRequired => "You don't have admin access",
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::FundraiserRequestNotFound { .. } => {
                "The requested fundraiser request was not found"
            }
            Error::ReceiptNotFound { .. } => "The requested receipt was not found",
            Error::UserNotFound { .. } => "The requested user was not found",
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::CampaignIsNotActive { .. } => {
                "The requested campaign is no longer accepting donations"
            }
            Error::FundraiserRequestIsNotPending { .. } => {
                "The requested fundraiser request has already been reviewed"
            }
            Error::EmailAlreadyRegistered { .. } => {
                "This email is already registered. Please login instead."
            }
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::InvalidConfiguration { .. } => "The server configuration is invalid",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::FailedToHashPassword(_) => "An error occurred when processing a password",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::RequestViolatesRules { .. } => StatusCode::BAD_REQUEST,
            Error::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::SessionExpired => StatusCode::UNAUTHORIZED,
            Error::AdminAccessRequired => StatusCode::FORBIDDEN,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::FundraiserRequestNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ReceiptNotFound { .. } => StatusCode::NOT_FOUND,
            Error::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ConcurrentModificationDetected => StatusCode::CONFLICT,
            Error::CampaignIsNotActive { .. } => StatusCode::CONFLICT,
            Error::FundraiserRequestIsNotPending { .. } => StatusCode::CONFLICT,
            Error::EmailAlreadyRegistered { .. } => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToHashPassword(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<PasswordHashError> for Error {
    fn from(error: PasswordHashError) -> Error {
        Error::FailedToHashPassword(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidForm(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::FailedToHashPassword(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
