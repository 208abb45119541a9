use std::sync::Arc;

use quran_track_config::load_settings;
use quran_track_pipeline::{build_transcriber, Decoder, HttpDecoder};
use quran_track_server::{create_router, load_reference_index, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("RUN_ENV").ok();
    let settings = load_settings(env.as_deref())?;

    init_tracing(&settings.observability);

    tracing::info!(environment = ?settings.environment, "starting quran-track server");

    let reference_index = Arc::new(load_reference_index(&settings.reference.corpus_path)?);
    tracing::info!(
        words = reference_index.len(),
        path = %settings.reference.corpus_path,
        "reference corpus loaded"
    );

    let decoder: Arc<dyn Decoder> =
        Arc::new(HttpDecoder::new(settings.decoder.url.clone(), settings.decoder.timeout_ms));
    let transcriber = Arc::from(build_transcriber(&settings.asr));

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let cleanup_interval = std::time::Duration::from_secs(settings.server.cleanup_interval_secs);

    let state = AppState::new(settings, reference_index, decoder, transcriber).with_env(env);
    let _cleanup = state.sessions.clone().start_cleanup_task(cleanup_interval);

    let app = create_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(observability: &quran_track_config::settings::ObservabilityConfig) {
    let filter = EnvFilter::try_new(&observability.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if observability.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
