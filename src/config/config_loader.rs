use anyhow::{Ok, Result};

use super::config_model::{Database, DotEnvyConfig, Mailer, Server, Stripe};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let stripe = Stripe {
        secret_key: std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY is invalid"),
        crew_product_id: std::env::var("STRIPE_CREW_PRODUCT_ID")
            .expect("STRIPE_CREW_PRODUCT_ID is invalid"),
        vessel_product_id: std::env::var("STRIPE_VESSEL_PRODUCT_ID")
            .expect("STRIPE_VESSEL_PRODUCT_ID is invalid"),
    };

    // Mailer is optional; decision emails are best-effort.
    let mailer = match std::env::var("MAILER_ENDPOINT") {
        std::result::Result::Ok(endpoint) if !endpoint.is_empty() => Some(Mailer {
            endpoint,
            api_key: std::env::var("MAILER_API_KEY").unwrap_or_default(),
            from_address: std::env::var("MAILER_FROM")
                .unwrap_or_else(|_| "no-reply@helmlog.app".to_string()),
        }),
        _ => None,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        stripe,
        mailer,
    })
}
