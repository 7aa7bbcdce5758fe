mod socket;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::ConnectInfo;
use axum::routing::any;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::{Future, pending};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;
use tracing::{debug, error, info, warn};

use crate::api;
use crate::config::Config;
use crate::stream::{self, Upgrader};

/// `/api`, the stream path, and a plain-text 404 for everything else.
pub fn router(config: &Config) -> Router {
    Router::new()
        .route("/api", any(api::handle))
        .route(&config.stream.path, any(stream::handle))
        .fallback(api::not_found)
        .with_state(Arc::new(Upgrader::new(&config.stream)))
}

pub struct Server {
    listener: TcpListener,
    config: Arc<Config>,
    router: Router,
}

impl Server {
    /// Binds the listening socket. The service cannot run without it, so
    /// callers treat an error here as fatal.
    pub async fn bind(config: Arc<Config>) -> Result<Self> {
        let listen_addr = config.server.listen_addr;
        let listener = TcpListener::bind(listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", listen_addr))?;

        let router = router(&config);
        Ok(Self {
            listener,
            config,
            router,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        self.run_until(pending::<()>()).await
    }

    /// Accepts connections until `shutdown` resolves. Sessions already
    /// running keep going on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = self.local_addr()?;
        info!("Listening on {}", local_addr);
        info!(
            "Serving /api and {} (websocket echo)",
            self.config.stream.path
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting on {}", local_addr);
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((client_socket, client_addr)) => {
                        debug!("New connection from {}", client_addr);
                        let config = self.config.clone();
                        let router = self.router.clone();

                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(client_socket, client_addr, config, router).await {
                                debug!("Error serving connection from {}: {}", client_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
            }
        }
    }
}

async fn handle_connection(
    client_socket: TcpStream,
    client_addr: SocketAddr,
    config: Arc<Config>,
    router: Router,
) -> Result<()> {
    if let Err(e) = socket::configure(&client_socket, &config.server) {
        warn!("Could not tune socket for {}: {}", client_addr, e);
    }

    let io = TokioIo::new(client_socket);
    let service = service_fn(move |mut req: http::Request<Incoming>| {
        req.extensions_mut().insert(ConnectInfo(client_addr));
        router.clone().oneshot(req.map(axum::body::Body::new))
    });

    http1::Builder::new()
        .serve_connection(io, service)
        .with_upgrades()
        .await?;

    debug!("Connection from {} closed", client_addr);
    Ok(())
}
