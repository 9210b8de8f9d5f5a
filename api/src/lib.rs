mod auth;
mod error;
mod registry;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use registry::{sha256_hex, VoterRegistry};
pub use state::{AdminCredentials, ApiState};

use axum::http::{header::CONTENT_TYPE, HeaderName, Method};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

pub async fn start_server(
    addr: SocketAddr,
    state: ApiState,
) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-access-token")]);

    let app = routes::create_routes().with_state(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
