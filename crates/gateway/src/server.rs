use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::{ConnectInfo, Query, State, WebSocketUpgrade},
        response::{Html, IntoResponse, Json},
        routing::get,
    },
    serde::Deserialize,
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use huddle_config::HuddleConfig;

use crate::{
    session::{self, JoinRequest},
    state::GatewayState,
};

/// Static landing page for plain HTTP requests. Served off the upgrade path
/// so it never interferes with WebSocket clients hitting /ws.
const LANDING_PAGE: &str = "<h1>You have reached the Web service successfully!</h1>\
<p>Please connect to WebSocket server from a WebSocket client for more features.</p>";

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the relay router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(landing_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_upgrade_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the relay HTTP + WebSocket server.
pub async fn start_gateway(bind: &str, port: u16, config: &HuddleConfig) -> anyhow::Result<()> {
    let state = GatewayState::new(config.rooms.max_users);
    let app = build_gateway_app(Arc::clone(&state));

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Startup banner.
    let lines = [
        format!("huddle gateway v{}", state.version),
        format!("listening on {addr}"),
        format!("room capacity {}", config.rooms.max_users),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    // Run the server with ConnectInfo for remote IP logging.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// Query params carried by the upgrade request.
#[derive(Debug, Deserialize)]
struct JoinQuery {
    name: Option<String>,
    room: Option<String>,
}

async fn landing_handler() -> impl IntoResponse {
    Html(LANDING_PAGE)
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
        "hostname": state.hostname,
        "rooms": state.room_count().await,
        "participants": state.participant_count().await,
    }))
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<JoinQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    info!(%addr, "client connected");
    let join = JoinRequest::from_params(params.name.as_deref(), params.room.as_deref());
    ws.on_upgrade(move |socket| session::handle_connection(socket, state, join))
}
