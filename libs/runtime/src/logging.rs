use crate::config::{LoggingConfig, Section};
use parking_lot::Mutex;
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";

// -------- level helpers --------

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn has_file(section: &Section) -> bool {
    !section.file.trim().is_empty()
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_target(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

/// Console filter: "default" sets the catch-all level, every other section
/// overrides the level for its target prefix.
fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level(&s.console_level))
        .unwrap_or(LevelFilter::INFO);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.console_level))
        })
}

/// File filter: a subsystem without its own file inherits the default file level.
fn file_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .filter(|s| has_file(s))
        .map(|s| parse_level(&s.file_level))
        .unwrap_or(LevelFilter::OFF);

    cfg.iter()
        .filter(|(name, s)| name.as_str() != DEFAULT_SECTION && has_file(s))
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.file_level))
        })
}

// -------- rotating file writers --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

/// Writer that drops records nobody asked to persist.
struct MaybeWriter(Option<RotWriter>);

impl Write for MaybeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes a record to its subsystem file, falling back to the default file.
struct FileRouter {
    default: Option<RotWriter>,
    by_target: Vec<(String, RotWriter)>,
}

impl FileRouter {
    fn build(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = FileRouter {
            default: None,
            by_target: Vec::new(),
        };
        for (name, section) in cfg.iter().filter(|(_, s)| has_file(s)) {
            let path = resolve_log_path(&section.file, base_dir);
            let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
            match open_rotating(&path, max_bytes as usize) {
                Ok(w) if name == DEFAULT_SECTION => router.default = Some(w),
                Ok(w) => router.by_target.push((name.clone(), w)),
                Err(e) => eprintln!(
                    "Failed to open log file '{}' for '{}': {}",
                    path.display(),
                    name,
                    e
                ),
            }
        }
        router
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_target.is_empty()
    }

    fn resolve(&self, target: &str) -> Option<RotWriter> {
        self.by_target
            .iter()
            .find(|(prefix, _)| matches_target(target, prefix))
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        MaybeWriter(self.resolve(meta.target()))
    }
}

/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(log_path: &Path, max_bytes: usize) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

// -------- public init --------

/// Initialize the global subscriber.
/// - `cfg`: logging sections; an empty map yields plain console output at INFO
/// - `base_dir`: directory used to resolve relative log file paths
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` *before* installing the subscriber
    let _ = tracing_log::LogTracer::init();

    let console = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = FileRouter::build(cfg, base_dir);
    let file = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(file_targets(cfg))
    });

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init();
}

// =================== tests ===================
