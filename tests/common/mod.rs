#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::extract::connect_info::MockConnectInfo;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

use nanhi_link::domain::click_event::ClickEvent;
use nanhi_link::domain::entities::{
    Click, Integration, IntegrationConfig, Link, LinkPatch, NewClick, NewLink, NewProject,
    Project, RedirectType,
};
use nanhi_link::domain::geo::{GeoLocator, NullGeoLocator};
use nanhi_link::domain::repositories::{
    ApiKey, ApiKeyRepository, ClickRepository, IntegrationRepository, LinkAnalytics, LinkFilter,
    LinkRepository, OwnerStats, ProjectRepository,
};
use nanhi_link::error::AppError;
use nanhi_link::infrastructure::persistence::DatabaseProbe;
use nanhi_link::routes::{api_router, redirect_router};
use nanhi_link::state::{AppState, Repositories, StateSettings};

pub const BASE_URL: &str = "https://nanhi.test";
pub const SIGNING_SECRET: &str = "test-signing-secret";

fn next(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

#[derive(Default)]
pub struct InMemoryLinks {
    links: Mutex<Vec<Link>>,
    ids: AtomicI64,
}

impl InMemoryLinks {
    pub fn get(&self, id: i64) -> Option<Link> {
        self.links.lock().unwrap().iter().find(|l| l.id == id).cloned()
    }

    fn matches(link: &Link, owner_id: Uuid, filter: &LinkFilter) -> bool {
        if link.owner_id != owner_id || link.is_deleted() {
            return false;
        }
        if filter.project_id.is_some() && link.project_id != filter.project_id {
            return false;
        }
        match &filter.search {
            Some(term) => {
                let term = term.to_lowercase();
                link.short_code.to_lowercase().contains(&term)
                    || link.destination_url.to_lowercase().contains(&term)
                    || link
                        .title
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinks {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.short_code == new_link.short_code) {
            return Err(AppError::conflict(
                "Short code is already taken",
                json!({ "short_code": new_link.short_code }),
            )
            .with_code("SHORT_CODE_TAKEN"));
        }

        let now = Utc::now();
        let link = Link {
            id: next(&self.ids),
            short_code: new_link.short_code,
            destination_url: new_link.destination_url,
            owner_id: new_link.owner_id,
            project_id: new_link.project_id,
            title: new_link.title,
            is_active: new_link.is_active,
            expires_at: new_link.expires_at,
            click_limit: new_link.click_limit,
            total_clicks: 0,
            password_hash: new_link.password_hash,
            redirect_type: new_link.redirect_type,
            targeting: new_link.targeting,
            tracking: new_link.tracking,
            utm: new_link.utm,
            rotation: new_link.rotation,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.short_code == short_code)
            .cloned())
    }

    async fn find_by_id(&self, id: i64, owner_id: Uuid) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id && l.owner_id == owner_id && !l.is_deleted())
            .cloned())
    }

    async fn code_exists(&self, short_code: &str) -> Result<bool, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.short_code == short_code))
    }

    async fn list(&self, owner_id: Uuid, filter: LinkFilter) -> Result<Vec<Link>, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .rev()
            .filter(|l| Self::matches(l, owner_id, &filter))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, owner_id: Uuid, filter: LinkFilter) -> Result<i64, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .filter(|l| Self::matches(l, owner_id, &filter))
            .count() as i64)
    }

    async fn update(&self, id: i64, owner_id: Uuid, patch: LinkPatch) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .iter_mut()
            .find(|l| l.id == id && l.owner_id == owner_id && !l.is_deleted())
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))?;
        patch.apply_to(link);
        link.updated_at = Utc::now();
        Ok(link.clone())
    }

    async fn soft_delete(&self, id: i64, owner_id: Uuid) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        match links
            .iter_mut()
            .find(|l| l.id == id && l.owner_id == owner_id && !l.is_deleted())
        {
            Some(link) => {
                link.deleted_at = Some(Utc::now());
                link.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub struct InMemoryClicks {
    links: Arc<InMemoryLinks>,
    clicks: Mutex<Vec<Click>>,
    ids: AtomicI64,
}

impl InMemoryClicks {
    pub fn new(links: Arc<InMemoryLinks>) -> Self {
        Self {
            links,
            clicks: Mutex::new(Vec::new()),
            ids: AtomicI64::new(0),
        }
    }

    pub fn all(&self) -> Vec<Click> {
        self.clicks.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClickRepository for InMemoryClicks {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        {
            let mut links = self.links.links.lock().unwrap();
            let link = links
                .iter_mut()
                .find(|l| l.id == new_click.link_id)
                .ok_or_else(|| AppError::bad_request("Unknown link", json!({})))?;
            link.total_clicks += 1;
        }

        let click = Click {
            id: next(&self.ids),
            link_id: new_click.link_id,
            clicked_at: new_click.clicked_at,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
            device: new_click.device,
            browser: new_click.browser,
            os: new_click.os,
            country: new_click.location.country,
            country_code: new_click.location.country_code,
            region: new_click.location.region,
            city: new_click.location.city,
        };
        self.clicks.lock().unwrap().push(click.clone());
        Ok(click)
    }

    async fn link_analytics(
        &self,
        link_id: i64,
        since: chrono::DateTime<Utc>,
        recent_limit: i64,
    ) -> Result<LinkAnalytics, AppError> {
        let clicks = self.clicks.lock().unwrap();
        let in_period: Vec<&Click> = clicks
            .iter()
            .filter(|c| c.link_id == link_id && c.clicked_at >= since)
            .collect();

        let mut ips: Vec<&str> = in_period.iter().filter_map(|c| c.ip.as_deref()).collect();
        ips.sort_unstable();
        ips.dedup();

        Ok(LinkAnalytics {
            total_clicks: in_period.len() as i64,
            unique_visitors: ips.len() as i64,
            recent_clicks: clicks
                .iter()
                .rev()
                .filter(|c| c.link_id == link_id)
                .take(recent_limit as usize)
                .cloned()
                .collect(),
            ..LinkAnalytics::default()
        })
    }

    async fn owner_stats(
        &self,
        owner_id: Uuid,
        since: chrono::DateTime<Utc>,
    ) -> Result<OwnerStats, AppError> {
        let links = self.links.links.lock().unwrap();
        let owned: Vec<&Link> = links
            .iter()
            .filter(|l| l.owner_id == owner_id && !l.is_deleted())
            .collect();
        let ids: Vec<i64> = owned.iter().map(|l| l.id).collect();
        let clicks = self.clicks.lock().unwrap();

        Ok(OwnerStats {
            total_links: owned.len() as i64,
            active_links: owned.iter().filter(|l| l.is_active).count() as i64,
            total_clicks: owned.iter().map(|l| l.total_clicks).sum(),
            clicks_last_24h: clicks
                .iter()
                .filter(|c| ids.contains(&c.link_id) && c.clicked_at >= since)
                .count() as i64,
            total_projects: 0,
        })
    }
}

#[derive(Default)]
pub struct InMemoryProjects {
    projects: Mutex<Vec<Project>>,
    ids: AtomicI64,
}

#[async_trait]
impl ProjectRepository for InMemoryProjects {
    async fn create(&self, new_project: NewProject) -> Result<Project, AppError> {
        let mut projects = self.projects.lock().unwrap();
        if projects
            .iter()
            .any(|p| p.owner_id == new_project.owner_id && p.name == new_project.name)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "projects_owner_name_key" }),
            ));
        }

        let project = Project {
            id: next(&self.ids),
            owner_id: new_project.owner_id,
            name: new_project.name,
            description: new_project.description,
            created_at: Utc::now(),
        };
        projects.push(project.clone());
        Ok(project)
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Project>, AppError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64, owner_id: Uuid) -> Result<Option<Project>, AppError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && p.owner_id == owner_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryApiKeys {
    keys: Mutex<Vec<ApiKey>>,
    ids: AtomicI64,
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeys {
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.key_hash == key_hash && k.revoked_at.is_none())
            .cloned())
    }

    async fn update_last_used(&self, id: i64) -> Result<(), AppError> {
        if let Some(key) = self.keys.lock().unwrap().iter_mut().find(|k| k.id == id) {
            key.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create(&self, owner_id: Uuid, name: &str, key_hash: &str) -> Result<ApiKey, AppError> {
        let key = ApiKey {
            id: next(&self.ids),
            owner_id,
            name: name.to_string(),
            key_hash: key_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        self.keys.lock().unwrap().push(key.clone());
        Ok(key)
    }

    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<ApiKey>, AppError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .filter(|k| owner_id.is_none_or(|o| k.owner_id == o))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiKey>, AppError> {
        Ok(self.keys.lock().unwrap().iter().find(|k| k.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.name == name)
            .cloned())
    }

    async fn revoke(&self, id: i64) -> Result<(), AppError> {
        let mut keys = self.keys.lock().unwrap();
        let key = keys
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| AppError::not_found("API key not found", json!({ "id": id })))?;
        key.revoked_at.get_or_insert_with(Utc::now);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryIntegrations {
    integrations: Mutex<Vec<Integration>>,
}

impl InMemoryIntegrations {
    pub fn add(&self, owner_id: Uuid, config: IntegrationConfig) {
        let mut integrations = self.integrations.lock().unwrap();
        let id = integrations.len() as i64 + 1;
        integrations.push(Integration {
            id,
            owner_id,
            enabled: true,
            config,
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl IntegrationRepository for InMemoryIntegrations {
    async fn list_enabled(&self, owner_id: Uuid) -> Result<Vec<Integration>, AppError> {
        Ok(self
            .integrations
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.owner_id == owner_id && i.enabled)
            .cloned()
            .collect())
    }
}

pub struct StaticProbe {
    pub healthy: bool,
}

#[async_trait]
impl DatabaseProbe for StaticProbe {
    async fn ping(&self) -> Result<(), AppError> {
        if self.healthy {
            Ok(())
        } else {
            Err(AppError::internal("connection refused", json!({})))
        }
    }
}

/// Application wired to in-memory repositories, with one API key.
pub struct TestApp {
    pub state: AppState,
    pub links: Arc<InMemoryLinks>,
    pub clicks: Arc<InMemoryClicks>,
    pub projects: Arc<InMemoryProjects>,
    pub integrations: Arc<InMemoryIntegrations>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
    pub owner_id: Uuid,
    pub api_key: String,
}

pub struct TestAppBuilder {
    geo: Arc<dyn GeoLocator>,
    healthy: bool,
    queue_capacity: usize,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            geo: Arc::new(NullGeoLocator),
            healthy: true,
            queue_capacity: 100,
        }
    }
}

impl TestAppBuilder {
    pub fn geo(mut self, geo: Arc<dyn GeoLocator>) -> Self {
        self.geo = geo;
        self
    }

    pub fn unhealthy_database(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub async fn build(self) -> TestApp {
        let links = Arc::new(InMemoryLinks::default());
        let clicks = Arc::new(InMemoryClicks::new(links.clone()));
        let projects = Arc::new(InMemoryProjects::default());
        let integrations = Arc::new(InMemoryIntegrations::default());
        let (click_tx, click_rx) = mpsc::channel(self.queue_capacity);

        let state = AppState::new(
            Repositories {
                links: links.clone(),
                clicks: clicks.clone(),
                projects: projects.clone(),
                api_keys: Arc::new(InMemoryApiKeys::default()),
                integrations: integrations.clone(),
            },
            self.geo,
            Arc::new(StaticProbe {
                healthy: self.healthy,
            }),
            click_tx,
            StateSettings {
                base_url: BASE_URL.to_string(),
                api_key_signing_secret: SIGNING_SECRET.to_string(),
                behind_proxy: false,
            },
        );

        let owner_id = Uuid::new_v4();
        let (_, api_key) = state
            .auth_service
            .create_key(owner_id, "test")
            .await
            .unwrap();

        TestApp {
            state,
            links,
            clicks,
            projects,
            integrations,
            click_rx,
            owner_id,
            api_key,
        }
    }
}

pub async fn test_app() -> TestApp {
    TestAppBuilder::default().build().await
}

fn peer() -> SocketAddr {
    SocketAddr::from(([203, 0, 113, 7], 40000))
}

fn serve(router: Router) -> TestServer {
    TestServer::new(router.layer(MockConnectInfo(peer()))).unwrap()
}

impl TestApp {
    pub fn api_server(&self) -> TestServer {
        serve(api_router(self.state.clone()))
    }

    pub fn redirect_server(&self) -> TestServer {
        serve(redirect_router(self.state.clone()))
    }

    /// Inserts a link for the test owner directly through the repository.
    pub async fn insert_link(&self, new_link: NewLink) -> Link {
        self.links.create(new_link).await.unwrap()
    }

    pub fn new_link(&self, short_code: &str, destination_url: &str) -> NewLink {
        NewLink {
            short_code: short_code.to_string(),
            destination_url: destination_url.to_string(),
            owner_id: self.owner_id,
            project_id: None,
            title: None,
            is_active: true,
            expires_at: None,
            click_limit: None,
            password_hash: None,
            redirect_type: RedirectType::Temporary,
            targeting: None,
            tracking: None,
            utm: None,
            rotation: Vec::new(),
        }
    }

    pub fn expired_link(&self, short_code: &str) -> NewLink {
        NewLink {
            expires_at: Some(Utc::now() - Duration::hours(1)),
            ..self.new_link(short_code, "https://example.com/expired")
        }
    }
}
