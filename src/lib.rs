use config::Config;
use database::Directory;
use services::ProvisioningContext;
use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod panel;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub directory: Arc<dyn Directory>,
    pub provisioning: ProvisioningContext,
}
