pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod quote;
pub mod routes;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

use quote::{DisabledRouting, OsrmClient, QuoteEstimator, RoutingProvider};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Config,
    pub estimator: Arc<QuoteEstimator>,
}

impl AppState {
    /// Build the state with the routing provider selected by `config`
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let router: Arc<dyn RoutingProvider> = match &config.routing.base_url {
            Some(url) => Arc::new(OsrmClient::new(url.clone(), config.routing.timeout)),
            None => {
                tracing::info!("No routing endpoint configured, quotes use straight-line distance");
                Arc::new(DisabledRouting)
            }
        };

        Self::with_router(Arc::new(db), config, router)
    }

    pub fn with_router(
        db: Arc<DatabaseConnection>,
        config: Config,
        router: Arc<dyn RoutingProvider>,
    ) -> Self {
        let estimator = Arc::new(QuoteEstimator::new(
            router,
            config.shop.clone(),
            config.pricing,
            config.routing.timeout,
        ));

        Self {
            db,
            config,
            estimator,
        }
    }
}
