//! Server test utilities.

use super::MultipartBody;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use yomitomo_common::AppConfig;
use yomitomo_gateway::{create_router, AppState};

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "pass123";

/// A response with its body decoded.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
    /// `name=value` of the first Set-Cookie header
    pub cookie: Option<String>,
    pub content_type: Option<String>,
    pub headers: HeaderMap,
}

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server rooted in a temporary directory.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let mut config = AppConfig::for_testing(temp_dir.path());
        modifier(&mut config);

        // Minimal HTML shells so page routes have something to serve
        std::fs::create_dir_all(&config.public.directory).expect("Failed to create public dir");
        for (file, marker) in [
            ("index.html", "index-page"),
            ("admin.html", "admin-page"),
            ("manga.html", "manga-page"),
            ("reader.html", "reader-page"),
        ] {
            std::fs::write(
                config.public.directory.join(file),
                format!("<!doctype html><title>{marker}</title>"),
            )
            .expect("Failed to write page");
        }

        let state = AppState::new(config)
            .await
            .expect("Failed to create app state");
        let router = create_router(state.clone());

        Self {
            router,
            state,
            temp_dir,
        }
    }

    pub fn root(&self) -> &std::path::Path {
        self.temp_dir.path()
    }

    /// Send a raw request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = response.headers().clone();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            text,
            cookie,
            content_type,
            headers,
        }
    }

    /// Send a request with an optional JSON body and session cookie.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.json("GET", uri, None, None).await
    }

    /// Send a multipart form.
    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        form: MultipartBody,
        cookie: Option<&str>,
    ) -> TestResponse {
        let (content_type, body) = form.finish();
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Log in with the given credentials, returning the session cookie.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.json(
            "POST",
            "/api/admin/login",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    /// Bootstrap the first admin and log in as them.
    pub async fn admin_cookie(&self) -> String {
        let created = self
            .json(
                "POST",
                "/api/admin/create",
                Some(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD })),
                None,
            )
            .await;
        assert_eq!(created.status, StatusCode::OK, "{}", created.text);

        let login = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text);
        login.cookie.expect("login should set a session cookie")
    }

    /// Create a manga and return its id.
    pub async fn create_manga(&self, cookie: &str, title: &str) -> i64 {
        let response = self
            .multipart(
                "POST",
                "/api/admin/manga",
                MultipartBody::new().text("title", title),
                Some(cookie),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_i64().unwrap()
    }

    /// Create a chapter with `pages` page images and return its id.
    pub async fn create_chapter(
        &self,
        cookie: &str,
        manga_id: i64,
        chapter_number: &str,
        pages: usize,
    ) -> i64 {
        let mut form = MultipartBody::new()
            .text("manga_id", &manga_id.to_string())
            .text("chapter_number", chapter_number)
            .text("title", &format!("Chapter {chapter_number}"));
        for index in 1..=pages {
            form = form.file("pages", &format!("p{index}.png"), format!("page-{index}").as_bytes());
        }

        let response = self
            .multipart("POST", "/api/admin/chapter", form, Some(cookie))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_i64().unwrap()
    }
}
