use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::server;

/// Serve the console assets and proxy the API. Flags override the config.
pub async fn cmd_serve(
    listen: Option<String>,
    static_dir: Option<PathBuf>,
    upstream: Option<String>,
) -> Result<()> {
    let config = Config::load()?;

    let mut settings = config.server.clone();
    if let Some(listen) = listen {
        settings.listen = listen;
    }
    if let Some(dir) = static_dir {
        settings.static_dir = dir;
    }
    let upstream = upstream.unwrap_or_else(|| config.upstream());

    info!(
        listen = %settings.listen,
        static_dir = %settings.static_dir.display(),
        %upstream,
        "starting console server"
    );
    server::serve(&settings, &upstream, config.request_timeout()).await
}
