use chrono::{Duration as ChronoDuration, Utc};
use conduct_api::config::{AppConfig, SeedAdmin};
use conduct_auth::{CredentialClaims, Role};
use conduct_core::Email;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, header};
use serde_json::json;

const SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "head@school.edu";
const ADMIN_PASSWORD: &str = "admin-pw";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig::new(SECRET).with_seed_admin(SeedAdmin {
            email: Email::parse(ADMIN_EMAIL).unwrap(),
            name: "Head Teacher".to_string(),
            password: ADMIN_PASSWORD.to_string(),
        });

        // Build app (same router as prod), but bind to an ephemeral port.
        let app = conduct_api::app::build_app(&config).expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Redirects must stay observable.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self { base_url, client, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.header(header::COOKIE, format!("token={token}"));
        }
        req.send().await.unwrap()
    }

    async fn post(&self, path: &str, token: Option<&str>, body: serde_json::Value) -> reqwest::Response {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.header(header::COOKIE, format!("token={token}"));
        }
        req.send().await.unwrap()
    }

    /// Sign in and return the `token` cookie value.
    async fn signin(&self, email: &str, password: &str) -> String {
        let res = self
            .post("/user/signin", None, json!({ "email": email, "password": password }))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        token_from_set_cookie(&res).expect("sign-in did not set the token cookie")
    }

    async fn register_student(&self, admin: &str, email: &str) -> String {
        let res = self
            .post(
                "/admin/students",
                Some(admin),
                json!({ "email": email, "name": "Student", "password": "student-pw" }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn token_from_set_cookie(res: &reqwest::Response) -> Option<String> {
    let cookie = res.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let (first, _) = cookie.split_once(';')?;
    first.strip_prefix("token=").map(str::to_string)
}

fn assert_signin_redirect(res: &reqwest::Response) {
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers()[header::LOCATION], "/user/signin");
}

fn mint_jwt(secret: &str, role: Role, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = CredentialClaims {
        sub: conduct_core::UserId::new(),
        email: Email::parse("minted@school.edu").unwrap(),
        role,
        issued_at: now - ChronoDuration::hours(2),
        expires_at: now + expires_in,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn public_routes_need_no_credential() {
    let srv = TestServer::spawn().await;

    assert_eq!(srv.get("/public/health", None).await.status(), StatusCode::OK);
    assert_eq!(srv.get("/user/signin", None).await.status(), StatusCode::OK);
    // A garbage credential does not block public routes.
    assert_eq!(srv.get("/public/health", Some("garbage")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_redirect_without_credential() {
    let srv = TestServer::spawn().await;

    for path in ["/admin/stats", "/student/me", "/users/me", "/no/such/page"] {
        let res = srv.get(path, None).await;
        assert_signin_redirect(&res);
    }
}

#[tokio::test]
async fn signin_sets_http_only_cookie() {
    let srv = TestServer::spawn().await;

    let res = srv
        .post("/user/signin", None, json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Secure"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "ADMIN");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn signin_failures_are_uniform() {
    let srv = TestServer::spawn().await;

    let res = srv.post("/user/signin", None, json!({ "email": ADMIN_EMAIL })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let wrong_password = srv
        .post("/user/signin", None, json!({ "email": ADMIN_EMAIL, "password": "nope" }))
        .await;
    let unknown_email = srv
        .post("/user/signin", None, json!({ "email": "ghost@school.edu", "password": "nope" }))
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let a: serde_json::Value = wrong_password.json().await.unwrap();
    let b: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn roles_gate_their_prefixes() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    srv.register_student(&admin, "kid@school.edu").await;
    let student = srv.signin("kid@school.edu", "student-pw").await;

    assert_eq!(srv.get("/admin/stats", Some(&admin)).await.status(), StatusCode::OK);
    assert_signin_redirect(&srv.get("/admin/stats", Some(&student)).await);

    assert_eq!(srv.get("/student/me", Some(&student)).await.status(), StatusCode::OK);
    assert_signin_redirect(&srv.get("/student/me", Some(&admin)).await);

    for token in [&admin, &student] {
        assert_eq!(srv.get("/users/me", Some(token)).await.status(), StatusCode::OK);
        // Unknown path: gate allows any authenticated role, router answers 404.
        assert_eq!(srv.get("/no/such/page", Some(token)).await.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn forged_and_expired_credentials_redirect() {
    let srv = TestServer::spawn().await;

    let forged = mint_jwt("another-secret", Role::Admin, ChronoDuration::minutes(10));
    assert_signin_redirect(&srv.get("/admin/stats", Some(&forged)).await);

    let expired = mint_jwt(SECRET, Role::Admin, -ChronoDuration::minutes(1));
    assert_signin_redirect(&srv.get("/admin/stats", Some(&expired)).await);

    let valid = mint_jwt(SECRET, Role::Admin, ChronoDuration::minutes(10));
    assert_eq!(srv.get("/admin/stats", Some(&valid)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn whoami_reflects_credential() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let body: serde_json::Value = srv.get("/users/me", Some(&admin)).await.json().await.unwrap();
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["role"], "ADMIN");
}

#[tokio::test]
async fn complaint_lifecycle_file_view_and_stats() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let student_id = srv.register_student(&admin, "kid@school.edu").await;

    // Scan the QR payload the student would display.
    let student = srv.signin("kid@school.edu", "student-pw").await;
    let qr: serde_json::Value = srv.get("/student/qr", Some(&student)).await.json().await.unwrap();
    let payload = qr["payload"].as_str().unwrap().to_string();
    let found: serde_json::Value = srv
        .get(&format!("/admin/students/lookup?payload={payload}"), Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(found["id"], student_id);

    // File two complaints, one without a photo.
    let res = srv
        .post(
            "/admin/complaints",
            Some(&admin),
            json!({ "studentId": student_id, "reason": "beard", "photo": "data:image/png;base64,AAAA" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = srv
        .post(
            "/admin/complaints",
            Some(&admin),
            json!({ "student_id": student_id, "reason": "uniform" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["message"], "Complaint created successfully");
    assert_eq!(created["complaint"]["photo"], conduct_complaints::DEFAULT_PHOTO);

    // The student sees both.
    let me: serde_json::Value = srv.get("/student/me", Some(&student)).await.json().await.unwrap();
    assert_eq!(me["email"], "kid@school.edu");
    assert_eq!(me["complaints"].as_array().unwrap().len(), 2);

    // Admin search finds the student with complaints attached.
    let list: serde_json::Value = srv
        .get("/admin/students?email=KID", Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["complaints"].as_array().unwrap().len(), 2);

    let stats: serde_json::Value = srv.get("/admin/stats", Some(&admin)).await.json().await.unwrap();
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["by_date"].as_array().unwrap().len(), 1);
    assert_eq!(stats["by_reason"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn complaint_validation() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv.post("/admin/complaints", Some(&admin), json!({ "reason": "beard" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "studentId and reason are required");

    let res = srv
        .post(
            "/admin/complaints",
            Some(&admin),
            json!({ "studentId": conduct_core::UserId::new().to_string(), "reason": "beard" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .post("/admin/complaints", Some(&admin), json!({ "studentId": "not-a-uuid", "reason": "beard" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_student_email_conflicts() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    srv.register_student(&admin, "kid@school.edu").await;

    let res = srv
        .post(
            "/admin/students",
            Some(&admin),
            json!({ "email": "Kid@School.edu", "name": "Again", "password": "pw" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn signout_clears_cookie() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv.post("/users/signout", Some(&admin), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn admin_can_register_another_admin() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv
        .post(
            "/admin/students",
            Some(&admin),
            json!({ "email": "deputy@school.edu", "name": "Deputy", "password": "deputy-pw", "role": "ADMIN" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "ADMIN");

    let deputy = srv.signin("deputy@school.edu", "deputy-pw").await;
    assert_eq!(srv.get("/admin/stats", Some(&deputy)).await.status(), StatusCode::OK);
    assert_signin_redirect(&srv.get("/student/me", Some(&deputy)).await);

    // Omitting the role still registers a student.
    srv.register_student(&admin, "kid@school.edu").await;
    let kid = srv.signin("kid@school.edu", "student-pw").await;
    assert_eq!(srv.get("/student/me", Some(&kid)).await.status(), StatusCode::OK);

    let res = srv
        .post(
            "/admin/students",
            Some(&admin),
            json!({ "email": "odd@school.edu", "name": "Odd", "password": "pw", "role": "JANITOR" }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let srv = TestServer::spawn().await;
    let admin = srv.signin(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = srv
        .client
        .post(srv.url("/user/signin"))
        .body("email=a&password=b")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = srv.post("/user/signin", None, json!({ "email": 5 })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].is_string());

    let res = srv.get("/admin/students/lookup", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}
