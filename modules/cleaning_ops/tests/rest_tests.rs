mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{cleaner, new_record, setup, supervisor};

const BOUNDARY: &str = "cleaning-test-boundary";

async fn send(router: &Router, req: Request<Body>) -> Result<(StatusCode, Value)> {
    let resp = router.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = resp.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_req(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "test-rid")
        .body(Body::from(body.to_string()))
        .unwrap()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: image/jpeg\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/registrations")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn create_user_returns_201_then_200() -> Result<()> {
    let env = setup().await?;
    let app = env.router();

    let (status, first) = send(
        &app,
        json_req(Method::POST, "/api/users", json!({"name": "Juan Perez", "role": "CLEANER"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["role"], "CLEANER");
    assert!(first["created_at"].is_string());

    let (status, again) = send(
        &app,
        json_req(Method::POST, "/api/users", json!({"name": "JUAN PEREZ", "role": "CLEANER"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], first["id"]);

    let (status, list) = send(&app, get("/api/users?role=CLEANER")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn create_user_without_role_is_a_problem() -> Result<()> {
    let env = setup().await?;
    let (status, body) = send(
        &env.router(),
        json_req(Method::POST, "/api/users", json!({"name": "Ana"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "name and role are required");
    assert_eq!(body["code"], "CLEANING_VALIDATION");
    assert_eq!(body["instance"], "/api/users");
    assert_eq!(body["request_id"], "test-rid");
    assert_eq!(body["errors"][0]["pointer"], "/role");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_400() -> Result<()> {
    let env = setup().await?;
    let req = Request::post("/api/tasks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&env.router(), req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    Ok(())
}

#[tokio::test]
async fn registration_multipart_round_trip() -> Result<()> {
    let env = setup().await?;
    let ana = cleaner(&env, "Ana").await?;
    let app = env.router();
    let user_id = ana.id.to_string();

    let (status, rec) = send(
        &app,
        multipart(&[
            Part::Text("userId", &user_id),
            Part::Text("ppu", "ABCD12"),
            Part::Text("busNumber", "1043"),
            Part::Text("terminal", "LA REINA"),
            Part::Text("cleaningType", "BARRIDO + TRAPEADO"),
            Part::Text("stickersRemoved", "true"),
            Part::Text("graffitiRemoved", "false"),
            Part::File("imageFront", "front photo.jpg", b"jpeg-bytes"),
            Part::File("imageBack", "", b""),
        ]),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{rec}");
    assert_eq!(rec["bus_number"], "1043");
    assert_eq!(rec["cleaning_type"], "BARRIDO + TRAPEADO");
    assert_eq!(rec["stickers_removed"], true);
    assert_eq!(rec["graffiti_removed"], false);
    assert!(rec["image_front_url"]
        .as_str()
        .unwrap()
        .ends_with("-front-photo.jpg"));
    assert!(rec["image_back_url"].is_null());
    assert_eq!(env.uploaded_files(), 1);

    let id = rec["id"].as_str().unwrap();
    let (status, fetched) = send(&app, get(&format!("/api/registrations/{id}"))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["ppu"], "ABCD12");

    let (status, list) = send(&app, get("/api/registrations?ppu=bcd&terminal=LA%20REINA")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, recent) = send(
        &app,
        get(&format!("/api/registrations/recent/ppu?userId={user_id}")),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recent, json!([{"ppu": "ABCD12", "bus_number": "1043"}]));
    Ok(())
}

#[tokio::test]
async fn registration_without_bus_number_stores_nothing() -> Result<()> {
    let env = setup().await?;
    let ana = cleaner(&env, "Ana").await?;
    let app = env.router();
    let user_id = ana.id.to_string();

    let (status, body) = send(
        &app,
        multipart(&[
            Part::Text("userId", &user_id),
            Part::Text("ppu", "ABCD12"),
            Part::Text("terminal", "LA REINA"),
            Part::Text("cleaningType", "FULL"),
            Part::File("imageFront", "front.jpg", b"jpeg-bytes"),
        ]),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Missing required fields");
    assert_eq!(body["errors"][0]["pointer"], "/busNumber");
    assert_eq!(env.uploaded_files(), 0);

    let (_, list) = send(&app, get("/api/registrations")).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn registration_rejects_unknown_cleaning_type() -> Result<()> {
    let env = setup().await?;
    let ana = cleaner(&env, "Ana").await?;
    let user_id = ana.id.to_string();

    let (status, body) = send(
        &env.router(),
        multipart(&[
            Part::Text("userId", &user_id),
            Part::Text("ppu", "ABCD12"),
            Part::Text("busNumber", "1"),
            Part::Text("terminal", "LA REINA"),
            Part::Text("cleaningType", "POLISH"),
        ]),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("BARRIDO"));
    Ok(())
}

#[tokio::test]
async fn registration_with_json_body_is_a_problem() -> Result<()> {
    let env = setup().await?;
    let resp = env
        .router()
        .oneshot(json_req(
            Method::POST,
            "/api/registrations",
            json!({"ppu": "ABCD12"}),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some(modkit::APPLICATION_PROBLEM_JSON)
    );

    let bytes = resp.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["status"], 400);
    assert_eq!(body["code"], "CLEANING_VALIDATION");
    assert_eq!(body["instance"], "/api/registrations");
    assert_eq!(env.uploaded_files(), 0);
    Ok(())
}

#[tokio::test]
async fn unknown_and_malformed_ids() -> Result<()> {
    let env = setup().await?;
    let app = env.router();

    let (status, body) = send(&app, get(&format!("/api/registrations/{}", Uuid::new_v4()))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "CLEANING_NOT_FOUND");

    let (status, _) = send(&app, get("/api/registrations/not-a-uuid")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/registrations/recent/ppu")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn task_lifecycle_over_http() -> Result<()> {
    let env = setup().await?;
    let ana = cleaner(&env, "Ana").await?;
    let boss = supervisor(&env, "Marta").await?;
    let app = env.router();

    let (status, _) = send(
        &app,
        json_req(Method::POST, "/api/tasks", json!({"cleanerId": ana.id, "supervisorId": boss.id})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, task) = send(
        &app,
        json_req(
            Method::POST,
            "/api/tasks",
            json!({"cleanerId": ana.id, "supervisorId": boss.id, "content": "Redo bus 1043"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "pending");
    assert!(task["completed_at"].is_null());

    let id = task["id"].as_str().unwrap();
    let complete = |id: &str| {
        Request::patch(format!("/api/tasks/{id}/complete"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, done) = send(&app, complete(id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "done");
    assert!(done["completed_at"].is_string());

    let unknown = Uuid::new_v4().to_string();
    let (status, body) = send(&app, complete(&unknown)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], format!("Task with id {unknown} not found"));

    let (status, pending) = send(
        &app,
        get(&format!("/api/tasks?cleanerId={}&status=pending", ana.id)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending, json!([]));

    let (status, _) = send(&app, get("/api/tasks?status=archived")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn inspection_requires_passed() -> Result<()> {
    let env = setup().await?;
    let ana = cleaner(&env, "Ana").await?;
    let boss = supervisor(&env, "Marta").await?;
    let rec = env.service.create_record(new_record(ana.id, "ABCD12")).await?;
    let app = env.router();

    let (status, body) = send(
        &app,
        json_req(
            Method::POST,
            "/api/inspections",
            json!({"cleaningId": rec.id, "supervisorId": boss.id}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "cleaningId, supervisorId and passed are required");

    let (status, created) = send(
        &app,
        json_req(
            Method::POST,
            "/api/inspections",
            json!({"cleaningId": rec.id, "supervisorId": boss.id, "passed": false}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["passed"], false);

    let (status, failed) = send(&app, get("/api/inspections?result=false")).await?;
    assert_eq!(status, StatusCode::OK);
    let row = &failed[0];
    assert_eq!(row["ppu"], "ABCD12");
    assert_eq!(row["supervisor_name"], "Marta");
    assert_eq!(row["cleaner_id"], json!(ana.id));

    let (_, passed) = send(&app, get("/api/inspections?result=true")).await?;
    assert_eq!(passed, json!([]));
    Ok(())
}

#[tokio::test]
async fn breaks_get_and_upsert() -> Result<()> {
    let env = setup().await?;
    let ana = cleaner(&env, "Ana").await?;
    let app = env.router();

    let (status, none) = send(&app, get(&format!("/api/breaks?userId={}", ana.id))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(none.is_null());

    let (status, _) = send(
        &app,
        json_req(Method::POST, "/api/breaks", json!({"breakTime": "13:00"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for time in ["13:00-13:30", "15:00-15:30"] {
        let (status, row) = send(
            &app,
            json_req(Method::POST, "/api/breaks", json!({"userId": ana.id, "breakTime": time})),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(row["break_time"], time);
    }

    let (_, one) = send(&app, get(&format!("/api/breaks?userId={}", ana.id))).await?;
    assert_eq!(one["break_time"], "15:00-15:30");

    let (_, all) = send(&app, get("/api/breaks")).await?;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["name"], "Ana");
    assert_eq!(all[0]["role"], "CLEANER");
    Ok(())
}

#[tokio::test]
async fn dashboard_shapes() -> Result<()> {
    let env = setup().await?;
    let ana = cleaner(&env, "Ana").await?;
    let mut input = new_record(ana.id, "ABCD12");
    input.stickers_removed = true;
    env.service.create_record(input).await?;
    let app = env.router();

    let (status, summary) = send(&app, get("/api/dashboard/summary")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totals"]["today"], 1);
    assert_eq!(summary["totals"]["month"], 1);
    assert_eq!(summary["topCleaners"][0]["name"], "Ana");
    assert_eq!(summary["topCleaners"][0]["total"], 1);
    assert_eq!(summary["byTerminal"][0]["terminal"], "EL ROBLE");
    assert_eq!(summary["byType"][0]["cleaning_type"], "FULL");

    let (status, report) = send(
        &app,
        get(&format!(
            "/api/dashboard/cleaner/{}?startDate=2000-01-01&endDate=2999-12-31",
            ana.id
        )),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total"], 1);
    assert_eq!(report["byType"][0]["total"], 1);
    assert_eq!(report["stickers"], json!({"stickers_true": 1, "stickers_false": 0}));
    assert_eq!(report["graffiti"], json!({"graffiti_true": 0, "graffiti_false": 1}));

    let (status, _) = send(
        &app,
        get(&format!("/api/dashboard/cleaner/{}?startDate=soon", ana.id)),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
