use std::sync::Arc;

use async_trait::async_trait;
use modkit::{DbModule, Module, ModuleCtx, OpenApiRegistry, RestfulModule};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::CleaningOpsConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmRepository;
use crate::infra::uploads;

/// Cleaning operations module: wires storage, uploads and REST routes.
#[derive(Default)]
pub struct CleaningOpsModule {
    // Keep the domain service behind ArcSwap for cheap read-mostly access.
    service: arc_swap::ArcSwapOption<Service>,
}

impl CleaningOpsModule {
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for CleaningOpsModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing cleaning_ops module");

        let cfg: CleaningOpsConfig = ctx.module_config()?;
        debug!(
            list_limit = cfg.list_limit,
            recent_ppu_limit = cfg.recent_ppu_limit,
            top_cleaners_limit = cfg.top_cleaners_limit,
            "Loaded cleaning_ops config"
        );

        let db = ctx.db_required()?;
        let repo = SeaOrmRepository::new(db.sea());
        let store = uploads::build_store(&cfg.storage);
        info!(backend = store.backend(), "Object store ready");

        let service = Service::new(
            Arc::new(repo),
            store,
            ServiceConfig {
                list_limit: cfg.list_limit,
                recent_ppu_limit: cfg.recent_ppu_limit,
                top_cleaners_limit: cfg.top_cleaners_limit,
            },
        );
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }
}

#[async_trait]
impl DbModule for CleaningOpsModule {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running cleaning_ops database migrations");
        Migrator::up(&db.sea(), None).await?;
        info!("cleaning_ops migrations completed");
        Ok(())
    }
}

impl RestfulModule for CleaningOpsModule {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering cleaning_ops REST routes");

        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        Ok(routes::register_routes(router, openapi, service))
    }
}
