mod config;
mod delivery;
mod repos;
mod system;

pub use config::Config;
pub use delivery::{IDeliverySink, WebhookDeliverySink};
pub use repos::{IReminderRepo, Repos};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::SystemClock;

#[derive(Clone)]
pub struct Context {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl Context {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        Self {
            repos,
            config: Config::new(),
            sys: Arc::new(SystemClock),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> Context {
    Context::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

/// Context backed by inmemory repositories, for tests
pub fn setup_context_inmemory() -> Context {
    Context {
        repos: Repos::create_inmemory(),
        config: Config::new(),
        sys: Arc::new(SystemClock),
    }
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
