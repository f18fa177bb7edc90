//! Shared test helpers for API integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{App, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use jobtrack_lib::auth::SESSION_COOKIE;
use jobtrack_lib::config::Config;
use jobtrack_lib::db::DbPool;
use jobtrack_lib::error::{AppError, AppResult};
use jobtrack_lib::services::{BlobStore, MemoryStorage};
use serde_json::{Value, json};

pub const TEST_PASSWORD: &str = "correct-horse-battery";
const BOUNDARY: &str = "jobtrack-test-boundary";

/// Everything a test needs besides the service itself.
pub struct TestContext {
    pub pool: DbPool,
    pub store: MemoryStorage,
    pub config: Config,
}

/// Fresh in-memory database with migrations applied.
pub async fn create_test_context() -> TestContext {
    let config = Config::development("sqlite::memory:");
    let pool = DbPool::new(&config.database)
        .await
        .expect("Failed to open in-memory database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");

    TestContext {
        pool,
        store: MemoryStorage::new(),
        config,
    }
}

/// Create the app with the same routes the server mounts under `/api`.
pub async fn create_test_app(
    ctx: &TestContext,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    create_test_app_with_store(ctx, Arc::new(ctx.store.clone())).await
}

/// Create the app backed by a specific blob store.
pub async fn create_test_app_with_store(
    ctx: &TestContext,
    store: Arc<dyn BlobStore>,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.pool.clone()))
            .app_data(web::Data::new(ctx.config.clone()))
            .app_data(web::Data::from(store))
            .service(web::scope("/api").configure(jobtrack_lib::api::configure)),
    )
    .await
}

/// Blob store over `MemoryStorage` whose writes or deletes can be switched to fail.
#[derive(Clone, Default)]
pub struct FailingStorage {
    pub inner: MemoryStorage,
    fail_put: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
}

impl FailingStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for FailingStorage {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(AppError::Storage("bucket unavailable".to_string()));
        }
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("bucket unavailable".to_string()));
        }
        self.inner.delete(key).await
    }
}

/// Call the service and return status plus JSON body.
pub async fn send<S>(app: &S, req: actix_http::Request) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Sign up a fresh account and return (session token, user id).
pub async fn signup<S>(app: &S, email: &str) -> (String, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Test User",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .to_request();

    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "signup should succeed");
    let token = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .expect("signup sets the session cookie");
    let body: Value = test::read_body_json(resp).await;
    let user_id = body["data"]["id"].as_str().unwrap().to_string();
    (token, user_id)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Build a `multipart/form-data` body. Returns the content type header value and the body.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Upload a document and return the response body.
pub async fn upload_document<S>(
    app: &S,
    token: &str,
    doc_type: &str,
    title: &str,
    is_default: bool,
) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let is_default = if is_default { "true" } else { "false" };
    let (content_type, body) = multipart_body(
        &[("type", doc_type), ("title", title), ("isDefault", is_default)],
        Some(("resume.pdf", "application/pdf", b"%PDF-1.4 test document")),
    );
    let req = test::TestRequest::post()
        .uri("/api/documents")
        .insert_header(bearer(token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();

    let (status, body) = send(app, req).await;
    assert_eq!(status, 201, "upload should succeed: {}", body);
    body
}

/// Create a job and return (status, body).
pub async fn create_job<S>(app: &S, token: &str, payload: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/jobs")
        .insert_header(bearer(token))
        .set_json(payload)
        .to_request();
    send(app, req).await
}

/// Minimal valid job payload.
pub fn job_payload(title: &str, company: &str) -> Value {
    json!({
        "title": title,
        "company": company,
        "country": "Germany",
        "city": "Berlin",
    })
}
