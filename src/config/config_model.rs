#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub stripe: Stripe,
    pub mailer: Option<Mailer>,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

/// Stripe credentials plus the two product families the plan-change
/// engine distinguishes: crew accounts and vessel-operator accounts.
#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub crew_product_id: String,
    pub vessel_product_id: String,
}

#[derive(Debug, Clone)]
pub struct Mailer {
    pub endpoint: String,
    pub api_key: String,
    pub from_address: String,
}
