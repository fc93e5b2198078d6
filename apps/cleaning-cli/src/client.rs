//! HTTP adapter for the cleaning operations API.

use modkit::TracedClient;
use reqwest::{multipart, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::model::*;

pub struct ApiClient {
    client: TracedClient,
    base: Url,
}

impl ApiClient {
    pub fn new(client: TracedClient, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|source| ClientError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Invalid(format!(
                "API URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Invalid(format!("invalid API URL '{}'", self.base)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.url(segments)?.as_str()))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = self.client.execute(builder.build()?).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::from_response(status, &body))
    }

    // ---- users ----

    #[instrument(name = "cleaning_cli.api.create_user", skip(self))]
    pub async fn create_user(&self, name: &str, role: Role) -> Result<User> {
        let req = self
            .request(Method::POST, &["users"])?
            .json(&json!({ "name": name, "role": role }));
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.list_users", skip(self))]
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
        let mut req = self.request(Method::GET, &["users"])?;
        if let Some(role) = role {
            req = req.query(&[("role", role.as_str())]);
        }
        self.send(req).await
    }

    // ---- registrations ----

    #[instrument(name = "cleaning_cli.api.list_records", skip(self))]
    pub async fn list_records(&self, query: &RecordQuery) -> Result<Vec<CleaningRecord>> {
        let req = self.request(Method::GET, &["registrations"])?.query(query);
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.get_record", skip(self))]
    pub async fn get_record(&self, id: Uuid) -> Result<CleaningRecord> {
        let req = self.request(Method::GET, &["registrations", &id.to_string()])?;
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.recent_ppu", skip(self))]
    pub async fn recent_ppu(&self, user_id: Uuid) -> Result<Vec<RecentPpu>> {
        let req = self
            .request(Method::GET, &["registrations", "recent", "ppu"])?
            .query(&[("userId", user_id.to_string())]);
        self.send(req).await
    }

    #[instrument(
        name = "cleaning_cli.api.create_record",
        skip_all,
        fields(ppu = %reg.ppu, terminal = %reg.terminal)
    )]
    pub async fn create_record(&self, reg: Registration) -> Result<CleaningRecord> {
        let flag = |b: bool| if b { "true" } else { "false" };
        let mut form = multipart::Form::new()
            .text("userId", reg.user_id.to_string())
            .text("ppu", reg.ppu)
            .text("busNumber", reg.bus_number)
            .text("terminal", reg.terminal)
            .text("cleaningType", reg.cleaning_type)
            .text("stickersRemoved", flag(reg.stickers_removed))
            .text("graffitiRemoved", flag(reg.graffiti_removed));
        for (field, photo) in [("imageFront", reg.image_front), ("imageBack", reg.image_back)] {
            if let Some(photo) = photo {
                let part = multipart::Part::bytes(photo.bytes)
                    .file_name(photo.file_name)
                    .mime_str(photo.content_type)?;
                form = form.part(field, part);
            }
        }
        let req = self
            .request(Method::POST, &["registrations"])?
            .multipart(form);
        self.send(req).await
    }

    // ---- inspections ----

    #[instrument(name = "cleaning_cli.api.create_inspection", skip(self))]
    pub async fn create_inspection(&self, new: &NewInspection) -> Result<Inspection> {
        let req = self.request(Method::POST, &["inspections"])?.json(new);
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.list_inspections", skip(self))]
    pub async fn list_inspections(&self, query: &InspectionQuery) -> Result<Vec<InspectionView>> {
        let req = self.request(Method::GET, &["inspections"])?.query(query);
        self.send(req).await
    }

    // ---- tasks ----

    #[instrument(name = "cleaning_cli.api.create_task", skip(self))]
    pub async fn create_task(&self, new: &NewTask) -> Result<Task> {
        let req = self.request(Method::POST, &["tasks"])?.json(new);
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.list_tasks", skip(self))]
    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let req = self.request(Method::GET, &["tasks"])?.query(query);
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.complete_task", skip(self))]
    pub async fn complete_task(&self, id: Uuid) -> Result<Task> {
        let req = self.request(Method::PATCH, &["tasks", &id.to_string(), "complete"])?;
        self.send(req).await
    }

    // ---- breaks ----

    /// `None` when no break is assigned to the user.
    #[instrument(name = "cleaning_cli.api.get_break", skip(self))]
    pub async fn get_break(&self, user_id: Uuid) -> Result<Option<BreakAssignment>> {
        let req = self
            .request(Method::GET, &["breaks"])?
            .query(&[("userId", user_id.to_string())]);
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.list_breaks", skip(self))]
    pub async fn list_breaks(&self) -> Result<Vec<BreakView>> {
        let req = self.request(Method::GET, &["breaks"])?;
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.set_break", skip(self))]
    pub async fn set_break(
        &self,
        user_id: Uuid,
        break_time: Option<&str>,
    ) -> Result<BreakAssignment> {
        let req = self
            .request(Method::POST, &["breaks"])?
            .json(&json!({ "userId": user_id, "breakTime": break_time }));
        self.send(req).await
    }

    // ---- dashboard ----

    #[instrument(name = "cleaning_cli.api.dashboard_summary", skip(self))]
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary> {
        let req = self.request(Method::GET, &["dashboard", "summary"])?;
        self.send(req).await
    }

    #[instrument(name = "cleaning_cli.api.cleaner_report", skip(self))]
    pub async fn cleaner_report(
        &self,
        cleaner_id: Uuid,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<CleanerReport> {
        let mut req = self.request(Method::GET, &["dashboard", "cleaner", &cleaner_id.to_string()])?;
        if let Some(from) = start_date {
            req = req.query(&[("startDate", from)]);
        }
        if let Some(to) = end_date {
            req = req.query(&[("endDate", to)]);
        }
        self.send(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    fn api(server: &MockServer) -> ApiClient {
        ApiClient::new(TracedClient::default(), &server.base_url()).unwrap()
    }

    fn user_json(id: Uuid, name: &str, role: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "role": role, "created_at": "2025-03-01T10:00:00Z"})
    }

    #[test]
    fn urls_keep_a_base_path_prefix() {
        let api = ApiClient::new(TracedClient::default(), "http://host:4000/ops/").unwrap();
        let url = api.url(&["tasks", "abc", "complete"]).unwrap();
        assert_eq!(url.as_str(), "http://host:4000/ops/api/tasks/abc/complete");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            ApiClient::new(TracedClient::default(), "not a url"),
            Err(ClientError::BaseUrl { .. })
        ));
        assert!(ApiClient::new(TracedClient::default(), "mailto:ops@example.com").is_err());
    }

    #[tokio::test]
    async fn create_user_posts_name_and_role() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/users")
                    .json_body(json!({"name": "Ana", "role": "CLEANER"}));
                then.status(201).json_body(user_json(id, "Ana", "CLEANER"));
            })
            .await;

        let user = api(&server).create_user("Ana", Role::Cleaner).await.unwrap();

        m.assert_async().await;
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Cleaner);
    }

    #[tokio::test]
    async fn list_records_sends_camel_case_filters() {
        let server = MockServer::start_async().await;
        let user = Uuid::new_v4();
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/registrations")
                    .query_param("userId", user.to_string())
                    .query_param("cleaningType", "FULL")
                    .query_param("endDate", "2025-03-31");
                then.status(200).json_body(json!([]));
            })
            .await;

        let rows = api(&server)
            .list_records(&RecordQuery {
                user_id: Some(user),
                cleaning_type: Some("FULL".into()),
                end_date: Some("2025-03-31".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        m.assert_async().await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn problem_detail_surfaces_on_failure() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        server
            .mock_async(|when, then| {
                when.method(PATCH).path(format!("/api/tasks/{id}/complete"));
                then.status(404)
                    .header("content-type", "application/problem+json")
                    .json_body(json!({
                        "type": "https://errors.example.com/CLEANING_NOT_FOUND",
                        "title": "Not Found",
                        "status": 404,
                        "detail": format!("Task with id {id} not found"),
                    }));
            })
            .await;

        let err = api(&server).complete_task(id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains(&format!("Task with id {id} not found")));
    }

    #[tokio::test]
    async fn unassigned_break_is_none() {
        let server = MockServer::start_async().await;
        let user = Uuid::new_v4();
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/breaks")
                    .query_param("userId", user.to_string());
                then.status(200).body("null");
            })
            .await;

        assert!(api(&server).get_break(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_break_sends_null_to_clear() {
        let server = MockServer::start_async().await;
        let user = Uuid::new_v4();
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/breaks")
                    .json_body(json!({"userId": user, "breakTime": null}));
                then.status(200).json_body(json!({
                    "user_id": user, "break_time": null, "updated_at": "2025-03-01T10:00:00Z"
                }));
            })
            .await;

        let row = api(&server).set_break(user, None).await.unwrap();
        m.assert_async().await;
        assert_eq!(row.break_time, None);
    }

    #[tokio::test]
    async fn registration_is_sent_as_multipart() {
        let server = MockServer::start_async().await;
        let user = Uuid::new_v4();
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/registrations")
                    .header_exists("content-type")
                    .body_contains("name=\"busNumber\"\r\n\r\n42")
                    .body_contains("name=\"stickersRemoved\"\r\n\r\ntrue")
                    .body_contains("name=\"imageFront\"; filename=\"front.jpg\"")
                    .body_contains("JPEGDATA");
                then.status(201).json_body(json!({
                    "id": Uuid::new_v4(), "user_id": user, "ppu": "ABCD12", "bus_number": "42",
                    "terminal": "LA REINA", "cleaning_type": "FULL",
                    "stickers_removed": true, "graffiti_removed": false,
                    "image_front_url": "/uploads/cleaning/1-front.jpg", "image_back_url": null,
                    "created_at": "2025-03-01T10:00:00Z"
                }));
            })
            .await;

        let record = api(&server)
            .create_record(Registration {
                user_id: user,
                ppu: "ABCD12".into(),
                bus_number: "42".into(),
                terminal: "LA REINA".into(),
                cleaning_type: "FULL".into(),
                stickers_removed: true,
                graffiti_removed: false,
                image_front: Some(Photo {
                    file_name: "front.jpg".into(),
                    content_type: "image/jpeg",
                    bytes: b"JPEGDATA".to_vec(),
                }),
                image_back: None,
            })
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(record.image_front_url.as_deref(), Some("/uploads/cleaning/1-front.jpg"));
    }
}
