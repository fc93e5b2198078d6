use async_trait::async_trait;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::{middleware::from_fn, response::IntoResponse, routing::get, Extension, Router};
use modkit::{ModuleCtx, OpenApiRegistry};
use modkit_db::DbHandle;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};

mod config;
mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use openapi::OpenApiCollector;

/// Where and how long to serve; comes from the process-level `server` section.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub bind_addr: String,
    /// Per-request timeout; zero disables it.
    pub request_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&runtime::ServerConfig> for ServeOptions {
    fn from(s: &runtime::ServerConfig) -> Self {
        Self {
            bind_addr: format!("{}:{}", s.host, s.port),
            request_timeout: Duration::from_secs(s.timeout_sec),
        }
    }
}

/// REST host: owns the outer router, global middleware, the merged OpenAPI
/// document and the HTTP listener.
pub struct ApiIngress {
    serve: ServeOptions,
    // Lock-free config using arc-swap for read-mostly access
    config: ArcSwap<ApiIngressConfig>,
    db: ArcSwapOption<DbHandle>,
    openapi: OpenApiCollector,
    // Store the finalized router from REST phase for serving
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,
    bound_addr: Mutex<Option<SocketAddr>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ServeOptions::default())
    }
}

impl ApiIngress {
    pub fn new(serve: ServeOptions) -> Self {
        Self {
            serve,
            config: ArcSwap::from_pointee(ApiIngressConfig::default()),
            db: ArcSwapOption::empty(),
            openapi: OpenApiCollector::default(),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
            bound_addr: Mutex::new(None),
        }
    }

    /// Get the current configuration (cheap clone from ArcSwap)
    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// The router kept by `rest_finalize`, if the REST phase has run.
    pub fn final_router(&self) -> Option<Router> {
        self.final_router.lock().clone()
    }

    /// Address the listener is bound to once `start` has run.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.bound_addr.lock()
    }

    pub fn openapi_document(&self) -> utoipa::openapi::OpenApi {
        self.openapi.document()
    }

    fn cors_layer(config: &ApiIngressConfig) -> CorsLayer {
        let origin = if config.allows_any_origin() {
            AllowOrigin::any()
        } else {
            let origins: Vec<HeaderValue> = config
                .cors_allowed_origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o.trim()) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        };
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
            .expose_headers([request_id::header()])
    }

    /// Wrap `router` with the global middleware.
    ///
    /// Outermost to innermost: SetRequestId -> PropagateRequestId -> Trace ->
    /// push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit.
    pub fn apply_middleware(&self, mut router: Router) -> Router {
        let config = self.get_config();
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes()));
        router = router.layer(Self::cors_layer(&config));
        if !self.serve.request_timeout.is_zero() {
            router = router.layer(TimeoutLayer::new(self.serve.request_timeout));
        }
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: ApiIngressConfig = ctx.module_config()?;
        tracing::debug!(
            origins = ?cfg.cors_allowed_origins,
            uploads_dir = %cfg.uploads_dir,
            enable_docs = cfg.enable_docs,
            "api_ingress configured"
        );
        self.config.store(Arc::new(cfg));
        self.db.store(ctx.db());
        Ok(())
    }
}

// REST host role: prepare/finalize the router, but do not start the server here.
impl modkit::RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let config = self.get_config();
        let health = web::HealthState {
            db: self.db.load_full(),
        };

        let router = router
            .route(
                "/api/health",
                get(web::health_check).layer(Extension(health)),
            )
            .nest_service("/uploads", ServeDir::new(&config.uploads_dir));

        tracing::debug!(uploads_dir = %config.uploads_dir, "REST host prepared base router");
        Ok(router)
    }

    fn rest_finalize(&self, _ctx: &ModuleCtx, mut router: Router) -> anyhow::Result<Router> {
        let config = self.get_config();

        if config.enable_docs {
            // Build once, serve as static JSON
            let doc = Arc::new(
                serde_json::to_value(self.openapi.document())
                    .context("serialize OpenAPI document")?,
            );
            tracing::info!(
                operations = self.openapi.operation_count(),
                "Serving OpenAPI document at /api/openapi.json"
            );
            router = router.route(
                "/api/openapi.json",
                get(move || {
                    let doc = doc.clone();
                    async move {
                        use axum::http::header;
                        (
                            [(header::CACHE_CONTROL, "no-store")],
                            axum::Json((*doc).clone()),
                        )
                            .into_response()
                    }
                }),
            );
        }

        let router = self.apply_middleware(router.fallback(web::route_not_found));

        // Keep the finalized router to be used by `start()`
        *self.final_router.lock() = Some(router.clone());
        tracing::debug!("REST host finalized router");
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        &self.openapi
    }
}

#[async_trait]
impl modkit::StatefulModule for ApiIngress {
    /// Bind the listener and serve in the background until `cancel` fires.
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let addr: SocketAddr = self
            .serve
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.serve.bind_addr))?;

        // Take the finalized router so the MutexGuard is dropped before awaits
        let stored = { self.final_router.lock().take() };
        let router = match stored {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving middleware only");
                self.apply_middleware(Router::new().fallback(web::route_not_found))
            }
        };

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        let local = listener.local_addr()?;
        *self.bound_addr.lock() = Some(local);
        tracing::info!("HTTP server listening on {}", local);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel.cancelled().await;
                    tracing::info!("HTTP server shutting down gracefully");
                })
                .await
                .context("HTTP server failed")
        });
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        let handle = { self.server.lock().take() };
        let Some(handle) = handle else {
            return Ok(());
        };
        match tokio::time::timeout(Duration::from_secs(30), handle).await {
            Ok(joined) => joined.context("HTTP server task panicked")?,
            Err(_) => {
                tracing::warn!("HTTP server did not stop within 30s");
                Ok(())
            }
        }
    }
}
