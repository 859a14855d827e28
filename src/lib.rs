use actix_web::web::{self, Data, FormConfig, JsonConfig, PathConfig, QueryConfig, ServiceConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::{bson, Client};
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod admin;
pub mod campaign;
pub mod config;
pub mod database;
pub mod donation;
pub mod error;
pub mod fundraiser;
pub mod monthly;
mod seed;
pub mod typedid;
pub mod user;
pub mod violations;

pub use admin::{AdminDonationBody, StatsBody};
pub use campaign::manager::CampaignForm;
pub use campaign::CampaignBody;
pub use config::Config;
pub use donation::manager::DonationForm;
pub use donation::ReceiptBody;
pub use error::Error;
pub use fundraiser::manager::FundraiserRequestForm;
pub use fundraiser::{ApprovalBody, FundraiserRequestBody};
pub use monthly::manager::MonthlyDonationForm;
pub use monthly::{MonthlyDonationBody, MonthlyPlanBody};
pub use user::manager::{SignInForm, SignUpForm};
pub use user::{AccountBody, DonationSummaryBody, SessionBody};

use crate::database::{Database, MongoDatabase};

/// Registers every route plus the extractor error formats. The app must also
/// carry `Data<Box<dyn Database>>` and `Data<Config>`.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(FormConfig::default().error_handler(|err, _req| {
        // format form errors with custom format
        Error::InvalidForm(err).into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        // format query errors with custom format
        Error::InvalidQuery(err).into()
    }))
    .service(campaign::endpoints::get_campaigns)
    .service(campaign::endpoints::get_campaign_by_id)
    .service(campaign::endpoints::get_all_campaigns)
    .service(campaign::endpoints::create_campaign)
    .service(donation::endpoints::donate_to_campaign)
    .service(donation::endpoints::download_receipt)
    .service(fundraiser::endpoints::submit_fundraiser_request)
    .service(fundraiser::endpoints::get_fundraiser_requests)
    .service(fundraiser::endpoints::approve_fundraiser_request)
    .service(fundraiser::endpoints::reject_fundraiser_request)
    .service(monthly::endpoints::get_monthly_plans)
    .service(monthly::endpoints::pledge_monthly_donation)
    .service(user::endpoints::sign_up)
    .service(user::endpoints::sign_in)
    .service(user::endpoints::sign_in_admin)
    .service(user::endpoints::sign_out)
    .service(user::endpoints::get_session)
    .service(user::endpoints::get_my_donations)
    .service(user::endpoints::grant_admin_role)
    .service(admin::endpoints::get_donations)
    .service(admin::endpoints::get_stats)
    .default_service(web::to(|| async { Error::PathNotFound.error_response() }));
}

async fn serve(config: Config) -> Result<(), Error> {
    info!("connecting to db: {}", config.database_uri);
    let db = Client::with_uri_str(&config.database_uri)
        .await?
        .database(&config.database_name);

    // ping the database to ensure connection is established
    db.run_command(bson::doc! { "ping": 1 }, None).await?;

    let db = MongoDatabase::initialize(db).await?;
    seed::seed(&db, &config).await?;

    let bind_address = config.bind_address.clone();
    let db = Data::new(Box::new(db) as Box<dyn Database>);
    let config = Data::new(config);

    info!("listening on {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}

/// Runs the server to completion on its own actix system.
pub fn run(config: Config) -> Result<(), Error> {
    actix_web::rt::System::new().block_on(serve(config))
}
