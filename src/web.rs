use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::app::TemperatureApp;
use crate::config::TempGraphConfig;
use crate::page::PageTemplates;
use crate::view::PageRegions;
use crate::api;

/// Answer given when a search arrives while another one is running
pub const BUSY_MESSAGE: &str = "Ya hay una búsqueda en curso.";

/// The single page session shared by all routes
pub type Session = TemperatureApp<PageRegions>;

#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
    templates: PageTemplates,
}

impl AppState {
    pub fn new(session: Session) -> crate::Result<Self> {
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            templates: PageTemplates::new()?,
        })
    }

    /// Lock the session for one query. `None` while another query holds it;
    /// such triggers are ignored rather than queued.
    pub(crate) fn try_session(&self) -> Option<tokio::sync::MutexGuard<'_, Session>> {
        match self.session.try_lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("Search ignored: a query is already in flight");
                None
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub city: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api", api::router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

pub async fn run(config: TempGraphConfig) -> anyhow::Result<()> {
    let session = TemperatureApp::from_config(&config, PageRegions::default())?;
    let app = router(AppState::new(session)?);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    // A plain visit starts idle; only the request that ran a search sees its outcome.
    let Some(city) = params.city.as_deref() else {
        return html(state.templates.render_idle());
    };

    let Some(mut session) = state.try_session() else {
        return match state.templates.render_busy() {
            Ok(body) => (StatusCode::CONFLICT, Html(body)).into_response(),
            Err(err) => page_error(&err),
        };
    };

    // An empty `?city=` is still a submitted search and fails validation.
    if let Err(err) = session.search(city).await {
        debug!("Search for '{}' ended in the error state: {}", city, err);
    }

    html(state.templates.render_session(&session, city))
}

fn html(page: crate::Result<String>) -> Response {
    match page {
        Ok(body) => Html(body).into_response(),
        Err(err) => page_error(&err),
    }
}

fn page_error(err: &crate::TempGraphError) -> Response {
    error!("Failed to render page: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.user_message()).into_response()
}

async fn health() -> &'static str {
    "ok"
}
