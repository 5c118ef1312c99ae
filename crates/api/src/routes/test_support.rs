//! Router harness for handler tests: mock database, temp blob root, real JWT service.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
    response::Response,
};
use http_body_util::BodyExt;
use sea_orm::MockDatabase;
use sitetrack_core::storage::{StorageConfig, StorageService};
use sitetrack_shared::types::UserId;
use sitetrack_shared::{JwtConfig, JwtService, TokenSubject};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{AppState, create_router};

const BOUNDARY: &str = "sitetrack-test-boundary";

pub(crate) struct TestApp {
    router: Router,
    jwt: Arc<JwtService>,
    dir: TempDir,
}

impl TestApp {
    pub(crate) fn new(db: MockDatabase) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::from_config(StorageConfig::new(dir.path())).unwrap();
        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "api-test-secret".to_string(),
            expires_hours: 1,
        }));

        let state = AppState {
            db: Arc::new(db.into_connection()),
            jwt_service: jwt.clone(),
            storage: Arc::new(storage),
            max_request_bytes: 1024 * 1024,
        };

        Self {
            router: create_router(state),
            jwt,
            dir,
        }
    }

    pub(crate) fn token(&self, user_id: i64, role: &str) -> String {
        self.jwt
            .issue(&TokenSubject {
                user_id: UserId(user_id),
                email: format!("user{user_id}@example.com"),
                role_code: role.to_string(),
            })
            .unwrap()
    }

    pub(crate) async fn send_raw(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub(crate) async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.send_raw(request).await;
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub(crate) fn put_blob(&self, relative: &str, bytes: &[u8]) {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    pub(crate) fn blobs(&self, namespace: &str) -> Vec<PathBuf> {
        std::fs::read_dir(self.dir.path().join(namespace))
            .map(|entries| entries.map(|e| e.unwrap().path()).collect())
            .unwrap_or_default()
    }
}

pub(crate) struct FilePart<'a> {
    name: &'a str,
    file_name: &'a str,
    content_type: &'a str,
    bytes: &'a [u8],
}

impl<'a> FilePart<'a> {
    pub(crate) fn new(
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    ) -> Self {
        Self {
            name,
            file_name,
            content_type,
            bytes,
        }
    }
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    if body.is_null() {
        builder.body(Body::empty()).unwrap()
    } else {
        builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

pub(crate) fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    files: &[FilePart<'_>],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.name, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::from(body)).unwrap()
}
