//! Test configuration helpers pointing every endpoint at a mock server

use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::MockServer;

use pixiv_dl::{Config, EffectExecutor, HttpFetcher, PixivCatalog, SessionEvent};

/// Configuration whose catalog and image hosts are both `server`, writing under `dir`
pub fn config_for(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = server.uri();
    config.download.image_base_url = server.uri();
    config.download.download_dir = dir.path().to_path_buf();
    config
}

/// Executor wired to the real HTTP collaborators, plus the receiving end of its events
pub fn http_executor(
    config: &Config,
) -> (EffectExecutor, mpsc::UnboundedReceiver<SessionEvent>) {
    let catalog = Arc::new(PixivCatalog::new(&config.catalog).expect("catalog client"));
    let fetcher = Arc::new(HttpFetcher::new(&config.download).expect("image client"));
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EffectExecutor::new(catalog, fetcher, tx, config.download.item_timeout),
        rx,
    )
}
