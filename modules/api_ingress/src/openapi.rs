use modkit::OpenApiRegistry;
use parking_lot::Mutex;
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

/// Collects the fragments contributed by REST modules into one document.
pub struct OpenApiCollector {
    doc: Mutex<OpenApi>,
}

impl Default for OpenApiCollector {
    fn default() -> Self {
        let info = InfoBuilder::new()
            .title("Cleaning Ops API")
            .version(env!("CARGO_PKG_VERSION"))
            .description(Some("Bus cleaning registrations, inspections, tasks and breaks"))
            .build();
        Self {
            doc: Mutex::new(OpenApiBuilder::new().info(info).build()),
        }
    }
}

impl OpenApiCollector {
    /// Snapshot of the merged document.
    pub fn document(&self) -> OpenApi {
        self.doc.lock().clone()
    }

    pub fn operation_count(&self) -> usize {
        self.doc
            .lock()
            .paths
            .paths
            .values()
            .map(|item| {
                [
                    &item.get,
                    &item.put,
                    &item.post,
                    &item.delete,
                    &item.patch,
                ]
                .iter()
                .filter(|op| op.is_some())
                .count()
            })
            .sum()
    }
}

impl OpenApiRegistry for OpenApiCollector {
    fn register_openapi(&self, fragment: OpenApi) {
        let paths = fragment.paths.paths.len();
        self.doc.lock().merge(fragment);
        tracing::debug!(paths, "Merged OpenAPI fragment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::path::{HttpMethod, OperationBuilder, PathItem, PathsBuilder};

    fn fragment(path: &str, method: HttpMethod) -> OpenApi {
        OpenApiBuilder::new()
            .paths(
                PathsBuilder::new()
                    .path(path, PathItem::new(method, OperationBuilder::new().build())),
            )
            .build()
    }

    #[test]
    fn fragments_merge_and_keep_host_info() {
        let c = OpenApiCollector::default();
        c.register_openapi(fragment("/api/users", HttpMethod::Get));
        c.register_openapi(fragment("/api/tasks", HttpMethod::Post));

        let doc = c.document();
        assert_eq!(doc.info.title, "Cleaning Ops API");
        assert!(doc.paths.paths.contains_key("/api/users"));
        assert!(doc.paths.paths.contains_key("/api/tasks"));
        assert_eq!(c.operation_count(), 2);
    }
}
