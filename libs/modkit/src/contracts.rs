use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

/// Sink for the OpenAPI fragments contributed by REST modules.
pub trait OpenApiRegistry: Send + Sync {
    /// Merge a module's paths and components into the host document.
    fn register_openapi(&self, doc: utoipa::openapi::OpenApi);
}

/// Core module: DI/wiring; do not rely on migrated schema here.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    async fn init(&self, ctx: &crate::context::ModuleCtx) -> anyhow::Result<()>;
}

#[async_trait]
pub trait DbModule: Send + Sync {
    /// Runs AFTER init, BEFORE REST/start.
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()>;
}

/// Pure wiring; must be sync. Runs AFTER DB migrations.
pub trait RestfulModule: Send + Sync {
    fn register_rest(
        &self,
        ctx: &crate::context::ModuleCtx,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router>;
}

/// REST host module: owns the outer router, global middleware and the listener.
/// Both hooks are sync and must not start the server.
pub trait RestHostModule: Send + Sync + 'static {
    /// Base routes (health, static files) before module routes are added.
    fn rest_prepare(
        &self,
        ctx: &crate::context::ModuleCtx,
        router: Router,
    ) -> anyhow::Result<Router>;

    /// Attach the OpenAPI document and the middleware stack, and keep the final router.
    fn rest_finalize(
        &self,
        ctx: &crate::context::ModuleCtx,
        router: Router,
    ) -> anyhow::Result<Router>;

    fn as_registry(&self) -> &dyn OpenApiRegistry;
}

#[async_trait]
pub trait StatefulModule: Send + Sync {
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()>;
    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()>;
}
