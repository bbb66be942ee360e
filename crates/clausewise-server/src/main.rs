use std::sync::Arc;

use clausewise_core::config::Config;
use clausewise_server::{logging, nlu_client, router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init_tracing(&config.log_format);

    let nlu = nlu_client(&config);
    let addr = config.listen_addr();
    info!(
        nlu_source = nlu.source().as_str(),
        upload_dir = %config.upload_dir,
        max_upload_bytes = config.max_upload_bytes,
        "starting clausewise"
    );

    let state = Arc::new(AppState::new(config, nlu)?);
    let app = router(state);

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
