mod cors;
mod csrf;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use credentials::{AdminState, CredentialRegistry};
use http::header::HeaderName;
use narrator_config::Config;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be opened, the
    /// upstream client cannot be built, or the CSRF header name is invalid
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let store = credentials::open_store(&config.credentials.store)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open credential store: {e}"))?;
        let registry = Arc::new(CredentialRegistry::new(&config.credentials, store));

        tracing::debug!(slots = registry.slot_count(), "credential registry ready");

        let tts_state = tts::build_server(&config, Arc::clone(&registry))?;
        let admin_state = AdminState {
            registry,
            validator: tts_state.key_validator(),
        };

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Proxy and generation routes
        app = app.merge(tts::endpoint_router().with_state(tts_state));

        // Slot and pool administration
        app = app.merge(credentials::admin_router().with_state(admin_state));

        // Apply middleware layers (innermost first)
        app = app.layer(DefaultBodyLimit::max(config.server.body_limit_bytes));

        app = app.layer(TraceLayer::new_for_http());

        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        if let Some(ref csrf_config) = config.server.csrf
            && csrf_config.enabled
        {
            let header_name = HeaderName::try_from(csrf_config.header_name.as_str())
                .map_err(|e| anyhow::anyhow!("invalid CSRF header name '{}': {e}", csrf_config.header_name))?;

            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let header_name = header_name.clone();
                async move { csrf::csrf_middleware(header_name, req, next).await }
            }));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
