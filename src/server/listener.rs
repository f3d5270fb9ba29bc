use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::routes::Router;

const BACKLOG: u32 = 1024;

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = bind(&cfg.listen_addr).await?;
    serve(listener, cfg).await
}

/// Binds `addr` with `SO_REUSEADDR` set.
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = tokio::net::lookup_host(addr)
        .await
        .with_context(|| format!("resolving listen address {addr}"))?
        .next()
        .with_context(|| format!("listen address {addr} resolved to nothing"))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket
        .bind(addr)
        .with_context(|| format!("binding {addr}"))?;

    let listener = socket.listen(BACKLOG)?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts connections forever, one task per connection.
///
/// Without `max_connections` nothing bounds the number of live tasks, and
/// since reads have no timeout every stalled client pins one of them.
pub async fn serve(listener: TcpListener, cfg: &Config) -> anyhow::Result<()> {
    let router = Arc::new(Router::new(cfg.directory.clone()));
    let limit = cfg.max_connections.map(|n| Arc::new(Semaphore::new(n)));

    info!(
        directory = %cfg.directory.display(),
        max_connections = ?cfg.max_connections,
        "Serving"
    );

    loop {
        let permit = match &limit {
            Some(semaphore) => Some(Arc::clone(semaphore).acquire_owned().await?),
            None => None,
        };

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let _permit = permit;
            let mut conn = Connection::new(socket, peer, router);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
