//! Runner orchestration: phase order, DB strategies, shutdown and error paths.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use async_trait::async_trait;
use modkit::{
    context::ModuleCtx,
    contracts::{DbModule, Module, OpenApiRegistry, RestHostModule, RestfulModule, StatefulModule},
    registry::{ModuleEntry, RegistryBuilder, RegistryError},
    runtime::{run, DbOptions, RunOptions, ShutdownOptions},
};

type CallTracker = Arc<Mutex<Vec<String>>>;

struct Tracked {
    name: &'static str,
    calls: CallTracker,
    fail_init: bool,
}

impl Tracked {
    fn new(name: &'static str, calls: &CallTracker) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: calls.clone(),
            fail_init: false,
        })
    }

    fn push(&self, what: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}.{}", self.name, what));
    }
}

#[async_trait]
impl Module for Tracked {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        assert_eq!(ctx.current_module(), Some(self.name));
        self.push("init");
        if self.fail_init {
            anyhow::bail!("init exploded");
        }
        Ok(())
    }
}

#[async_trait]
impl DbModule for Tracked {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        db.ping().await?;
        self.push("migrate");
        Ok(())
    }
}

impl RestfulModule for Tracked {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router> {
        self.push("rest");
        openapi.register_openapi(utoipa::openapi::OpenApi::default());
        Ok(router.route("/api/ping", get(|| async { "pong" })))
    }
}

impl RestHostModule for Tracked {
    fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        self.push("prepare");
        Ok(router)
    }

    fn rest_finalize(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        self.push("finalize");
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

impl OpenApiRegistry for Tracked {
    fn register_openapi(&self, _doc: utoipa::openapi::OpenApi) {
        self.push("openapi");
    }
}

#[async_trait]
impl StatefulModule for Tracked {
    async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.push("start");
        Ok(())
    }

    async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
        self.push("stop");
        Ok(())
    }
}

fn empty_cfg() -> Arc<std::collections::HashMap<String, serde_json::Value>> {
    Arc::new(std::collections::HashMap::new())
}

#[tokio::test]
async fn phases_run_in_order() {
    let calls: CallTracker = Arc::default();
    let domain = Tracked::new("domain", &calls);
    let host = Tracked::new("host", &calls);

    let registry = RegistryBuilder::default()
        .register(
            ModuleEntry::new("domain", domain.clone())
                .with_db(domain.clone())
                .with_rest(domain),
        )
        .register(
            ModuleEntry::new("host", host.clone())
                .with_rest_host(host.clone())
                .with_stateful(host),
        )
        .build()
        .unwrap();

    let db = modkit_db::DbHandle::connect("sqlite::memory:", modkit_db::ConnectOpts::default())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(run(RunOptions {
        registry,
        modules_cfg: empty_cfg(),
        db: DbOptions::Existing(Arc::new(db)),
        shutdown: ShutdownOptions::Token(cancel.clone()),
    }));

    // Wait until the start phase has been reached.
    timeout(Duration::from_secs(5), async {
        while !calls.lock().unwrap().contains(&"host.start".to_string()) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("start phase reached");

    cancel.cancel();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner finished")
        .unwrap()
        .unwrap();

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "domain.init",
            "host.init",
            "domain.migrate",
            "host.prepare",
            "domain.rest",
            "host.openapi",
            "host.finalize",
            "host.start",
            "host.stop",
        ]
    );
}

#[tokio::test]
async fn init_failure_names_module() {
    let calls: CallTracker = Arc::default();
    let broken = Arc::new(Tracked {
        name: "domain",
        calls: calls.clone(),
        fail_init: true,
    });
    let registry = RegistryBuilder::default()
        .register(ModuleEntry::new("domain", broken))
        .build()
        .unwrap();

    let err = run(RunOptions {
        registry,
        modules_cfg: empty_cfg(),
        db: DbOptions::None,
        shutdown: ShutdownOptions::Token(CancellationToken::new()),
    })
    .await
    .unwrap_err();

    let err = err.downcast::<RegistryError>().unwrap();
    assert!(matches!(err, RegistryError::Init { module: "domain", .. }));
}

#[tokio::test]
async fn db_module_without_database_fails() {
    let calls: CallTracker = Arc::default();
    let domain = Tracked::new("domain", &calls);
    let registry = RegistryBuilder::default()
        .register(ModuleEntry::new("domain", domain.clone()).with_db(domain))
        .build()
        .unwrap();

    let err = run(RunOptions {
        registry,
        modules_cfg: empty_cfg(),
        db: DbOptions::None,
        shutdown: ShutdownOptions::Token(CancellationToken::new()),
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast::<RegistryError>().unwrap(),
        RegistryError::DbRequired
    ));
}

#[tokio::test]
async fn rest_module_requires_host() {
    let calls: CallTracker = Arc::default();
    let domain = Tracked::new("domain", &calls);
    let registry = RegistryBuilder::default()
        .register(ModuleEntry::new("domain", domain.clone()).with_rest(domain))
        .build()
        .unwrap();

    let err = run(RunOptions {
        registry,
        modules_cfg: empty_cfg(),
        db: DbOptions::None,
        shutdown: ShutdownOptions::Token(CancellationToken::new()),
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast::<RegistryError>().unwrap(),
        RegistryError::RestRequiresHost
    ));
}

#[test]
fn duplicate_names_and_hosts_rejected() {
    let calls: CallTracker = Arc::default();
    let a = Tracked::new("a", &calls);

    let dup = RegistryBuilder::default()
        .register(ModuleEntry::new("a", a.clone()))
        .register(ModuleEntry::new("a", a.clone()))
        .build();
    assert!(matches!(dup, Err(RegistryError::DuplicateModule("a"))));

    let hosts = RegistryBuilder::default()
        .register(ModuleEntry::new("h1", a.clone()).with_rest_host(a.clone()))
        .register(ModuleEntry::new("h2", a.clone()).with_rest_host(a))
        .build();
    assert!(matches!(hosts, Err(RegistryError::MultipleRestHosts)));
}

#[tokio::test]
async fn future_shutdown_stops_runner() {
    let calls: CallTracker = Arc::default();
    let host = Tracked::new("host", &calls);
    let registry = RegistryBuilder::default()
        .register(ModuleEntry::new("host", host.clone()).with_stateful(host))
        .build()
        .unwrap();

    let result = timeout(
        Duration::from_secs(5),
        run(RunOptions {
            registry,
            modules_cfg: empty_cfg(),
            db: DbOptions::None,
            shutdown: ShutdownOptions::Future(Box::pin(tokio::time::sleep(
                Duration::from_millis(50),
            ))),
        }),
    )
    .await
    .expect("runner finished");

    assert!(result.is_ok());
    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["host.init", "host.start", "host.stop"]);
}
