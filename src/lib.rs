pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod routes;
pub mod screens;
pub mod session;

use std::sync::Arc;

use api::{ApiClient, Transport, TransportError};
use config::Config;
use routes::RouteGate;
use screens::InFlight;
use session::{FileStorage, SessionStore};

/// Everything a screen needs, built once per run and shared by reference
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub gate: RouteGate,
    pub in_flight: InFlight,
}

impl AppState {
    /// State backed by the configured session file and an HTTP transport
    pub fn new(config: Config) -> Result<Self, TransportError> {
        let session = SessionStore::open(FileStorage::new(&config.session.path));
        let api = ApiClient::new(&config.api.base_url, session.clone())?;
        Ok(Self::from_parts(config, session, api))
    }

    /// State over an arbitrary transport
    pub fn with_transport(
        config: Config,
        session: SessionStore,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let api = ApiClient::with_transport(&config.api.base_url, session.clone(), transport);
        Self::from_parts(config, session, api)
    }

    fn from_parts(config: Config, session: SessionStore, api: ApiClient) -> Self {
        Self {
            gate: RouteGate::new(session.clone()),
            config,
            session,
            api,
            in_flight: InFlight::new(),
        }
    }
}
