use ghcnd::web::create_router;
use ghcnd::Ghcnd;
use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ADDR_ENV: &str = "GHCND_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:5000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr: SocketAddr = std::env::var(ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let client = Arc::new(Ghcnd::from_env()?);
    // Requests arriving before this finishes load the tables themselves.
    client.spawn_warmup();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("GHCN-Daily station server listening on http://{}", addr);
    info!("  GET /get_stations?latitude=..&longitude=..&radius_km=..[&station_count=..&start_year=..&end_year=..&elements=TMIN,TMAX]");
    info!("  GET /get_weather_data?station_id=..[&start_year=..&end_year=..]");
    info!("  GET /status");
    info!("  GET /health");

    axum::serve(listener, create_router(client)).await?;
    Ok(())
}
