//! A fully routed app over in-memory collaborators, driven with
//! `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use super::identity::USER_ID_HEADER;
use crate::config::Config;
use crate::review::testing::{FakeImages, FakePapers, FakeReviews};
use crate::review::{Capabilities, FormRegistry, ReviewService};
use crate::state::AppState;

pub const USER: &str = "user-1";
const BOUNDARY: &str = "review-form-boundary";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub reviews: Arc<FakeReviews>,
    router: Router,
}

impl TestApp {
    pub fn new(max_image_bytes: usize, max_open_forms: usize) -> Self {
        let templates = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        crate::templates::init(&templates).unwrap();

        let config = Config {
            database_url: String::new(),
            image_folder: std::env::temp_dir(),
            public_base_url: "http://localhost".into(),
            semantic_scholar_url: "http://localhost".into(),
            semantic_scholar_api_key: None,
            lookup_debounce: Duration::ZERO,
            http_timeout: Duration::from_secs(1),
            image_upload_default: true,
            max_image_bytes,
            form_idle_timeout: Duration::from_secs(3600),
            max_open_forms,
            host: "127.0.0.1".into(),
            port: 0,
        };

        let reviews = Arc::new(FakeReviews::default());
        let service = ReviewService::new(
            Arc::new(FakePapers::new(&[])),
            Arc::new(FakeImages::default()),
            reviews.clone(),
            config.lookup_debounce,
        );
        let state = Arc::new(AppState {
            config: Arc::new(config),
            forms: FormRegistry::new(max_open_forms),
            reviews: service,
        });

        Self {
            router: super::router(state.clone()),
            state,
            reviews,
        }
    }

    pub async fn form(&self, has_image_upload: bool) -> Uuid {
        self.state
            .forms
            .create(USER, "Hanako", Capabilities { has_image_upload })
            .await
            .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        ServiceExt::<Request<Body>>::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Sends `req` and returns the status and the body as text.
    pub async fn call(&self, req: Request<Body>) -> (StatusCode, String) {
        let resp = self.send(req).await;
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(USER_ID_HEADER, USER)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(USER_ID_HEADER, USER)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A single-field multipart upload.
pub fn upload(uri: &str, field: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"fig.png\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(USER_ID_HEADER, USER)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
