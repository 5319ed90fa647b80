//! Shared application state for both HTTP servers.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{
    AuthService, LinkService, ProjectService, RedirectService, StatsService,
};
use crate::domain::click_event::ClickEvent;
use crate::domain::geo::GeoLocator;
use crate::domain::repositories::{
    ApiKeyRepository, ClickRepository, IntegrationRepository, LinkRepository, ProjectRepository,
};
use crate::infrastructure::persistence::DatabaseProbe;

/// Repository handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub links: Arc<dyn LinkRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub integrations: Arc<dyn IntegrationRepository>,
}

/// Request-path settings copied out of [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub base_url: String,
    pub api_key_signing_secret: String,
    pub behind_proxy: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub project_service: Arc<ProjectService>,
    pub stats_service: Arc<StatsService>,
    pub auth_service: Arc<AuthService>,
    pub redirect_service: Arc<RedirectService>,
    pub click_tx: mpsc::Sender<ClickEvent>,
    pub database: Arc<dyn DatabaseProbe>,
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        geo: Arc<dyn GeoLocator>,
        database: Arc<dyn DatabaseProbe>,
        click_tx: mpsc::Sender<ClickEvent>,
        settings: StateSettings,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(
                repos.links.clone(),
                repos.projects.clone(),
                settings.base_url,
            )),
            project_service: Arc::new(ProjectService::new(repos.projects)),
            stats_service: Arc::new(StatsService::new(repos.links.clone(), repos.clicks)),
            auth_service: Arc::new(AuthService::new(
                repos.api_keys,
                settings.api_key_signing_secret,
            )),
            redirect_service: Arc::new(RedirectService::new(
                repos.links,
                repos.integrations,
                geo,
            )),
            click_tx,
            database,
            behind_proxy: settings.behind_proxy,
        }
    }
}
