//! End-to-end HTTP tests: the full router over in-memory SurrealDB,
//! driven with `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use devassist_auth::AuthConfig;
use devassist_core::models::user::{CreateUser, Role};
use devassist_core::repository::UserRepository;
use devassist_db::repository::SurrealUserRepository;
use devassist_db::{DbConfig, DbManager, run_migrations};
use devassist_server::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "devassist";

struct TestApp {
    router: Router,
}

impl TestApp {
    async fn new(ai_assist_enabled: bool) -> Self {
        let db = DbManager::connect(&DbConfig::default()).await.unwrap();
        run_migrations(db.client()).await.unwrap();

        let auth = AuthConfig {
            jwt_secret: "api-test-secret".into(),
            ..Default::default()
        };

        let users = SurrealUserRepository::new(db.client().clone());
        for (email, role) in [
            ("admin@example.com", Role::Admin),
            ("support@example.com", Role::Support),
            ("eng-a@example.com", Role::Engineer),
            ("eng-b@example.com", Role::Engineer),
        ] {
            users
                .create(CreateUser {
                    email: email.into(),
                    name: None,
                    role,
                    password: PASSWORD.into(),
                })
                .await
                .unwrap();
        }

        let state = AppState::new(db, auth, ai_assist_enabled);
        Self {
            router: build_router(state),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn login(&self, email: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body
    }

    async fn token(&self, email: &str) -> String {
        self.login(email).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn create_ticket(&self, token: &str, title: &str, severity: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/tickets",
                Some(token),
                Some(json!({
                    "title": title,
                    "description": "Reproducible on every run",
                    "severity": severity,
                    "component": "CI",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new(false).await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn login_returns_tokens_without_password_hash() {
    let app = TestApp::new(false).await;
    let body = app.login("eng-a@example.com").await;

    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
    assert_eq!(body["user"]["email"], "eng-a@example.com");
    assert_eq!(body["user"]["role"], "ENGINEER");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn bad_credentials_share_one_response() {
    let app = TestApp::new(false).await;

    let (s1, b1) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        )
        .await;
    let (s2, b2) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "eng-a@example.com", "password": "wrong" })),
        )
        .await;

    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);
    assert_eq!(b1["statusCode"], 401);
}

#[tokio::test]
async fn me_requires_bearer_token() {
    let app = TestApp::new(false).await;

    let (status, body) = app.send(Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app
        .send(Method::GET, "/auth/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.token("support@example.com").await;
    let (status, body) = app.send(Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "support@example.com");
    assert_eq!(body["user"]["role"], "SUPPORT");
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = TestApp::new(false).await;
    let login = app.login("eng-a@example.com").await;
    let refresh = login["refreshToken"].as_str().unwrap();

    let (status, _) = app.send(Method::GET, "/auth/me", Some(refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refreshToken": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].is_string());

    // Single use.
    let (status, _) = app
        .send(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refreshToken": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let app = TestApp::new(false).await;
    let login = app.login("eng-a@example.com").await;
    let access = login["accessToken"].as_str().unwrap();
    let refresh = login["refreshToken"].as_str().unwrap();

    let (status, _) = app
        .send(Method::POST, "/auth/logout", Some(access), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refreshToken": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn engineer_creates_and_stranger_cannot_patch() {
    let app = TestApp::new(false).await;
    let a = app.token("eng-a@example.com").await;
    let b = app.token("eng-b@example.com").await;
    let a_id = app.login("eng-a@example.com").await["user"]["id"].clone();

    let ticket = app.create_ticket(&a, "Build is red", "P1").await;
    assert_eq!(ticket["status"], "OPEN");
    assert_eq!(ticket["requesterId"], a_id);
    let uri = format!("/tickets/{}", ticket["id"].as_str().unwrap());

    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&b),
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this ticket");

    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&a),
            Some(json!({ "status": "IN_PROGRESS", "slaDueAt": "2030-05-01T12:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_PROGRESS");
    assert_eq!(body["requesterId"], a_id);
    assert!(body["slaDueAt"].is_string());

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(&a), Some(json!({ "slaDueAt": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["slaDueAt"].is_null());
    assert_eq!(body["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn create_ticket_validation_reports_fields() {
    let app = TestApp::new(false).await;
    let token = app.token("eng-a@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/tickets",
            Some(&token),
            Some(json!({
                "title": "ab",
                "description": "short",
                "severity": "P1",
                "component": "CI",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert!(body["fields"]["title"].is_array());
    assert!(body["fields"]["description"].is_array());

    let (status, body) = app
        .send(
            Method::POST,
            "/tickets",
            Some(&token),
            Some(json!({
                "title": "Valid title",
                "description": "Long enough description",
                "severity": "P7",
                "component": "CI",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["severity"].is_array());

    let (status, body) = app
        .send(
            Method::POST,
            "/tickets",
            Some(&token),
            Some(json!({
                "description": "Long enough description",
                "severity": "P1",
                "component": "CI",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["title"][0], "title is required");
}

#[tokio::test]
async fn kb_without_tags_reports_field() {
    let app = TestApp::new(false).await;
    let support = app.token("support@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/kb",
            Some(&support),
            Some(json!({ "title": "No tags here", "body": "Body that is long enough" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["tags"].is_array());
}

#[tokio::test]
async fn assignment_is_staff_only() {
    let app = TestApp::new(false).await;
    let eng = app.token("eng-a@example.com").await;
    let support = app.token("support@example.com").await;

    let ticket = app.create_ticket(&eng, "Assign this", "P2").await;
    let uri = format!("/tickets/{}/assign", ticket["id"].as_str().unwrap());

    let (status, _) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&eng),
            Some(json!({ "assigneeId": "me" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&support),
            Some(json!({ "assigneeId": "support-queue" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assigneeId"], "support-queue");

    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&support),
            Some(json!({ "assigneeId": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["assigneeId"].is_null());
}

#[tokio::test]
async fn list_filters_combine() {
    let app = TestApp::new(false).await;
    let token = app.token("eng-a@example.com").await;

    let wanted = app.create_ticket(&token, "Prod outage", "P0").await;
    app.create_ticket(&token, "Minor nit", "P3").await;

    let (status, body) = app
        .send(
            Method::GET,
            "/tickets?status=OPEN&severity=P0",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], wanted["id"]);

    let (status, body) = app
        .send(Method::GET, "/tickets?query=outage", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (_, body) = app
        .send(Method::GET, "/tickets?query=OUTAGE", Some(&token), None)
        .await;
    assert_eq!(body["total"], 0);

    let (status, body) = app
        .send(Method::GET, "/tickets?status=CLOSED", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["status"].is_array());
}

#[tokio::test]
async fn ticket_detail_and_comments() {
    let app = TestApp::new(false).await;
    let owner = app.token("eng-a@example.com").await;
    let stranger = app.token("eng-b@example.com").await;
    let support = app.token("support@example.com").await;

    let ticket = app.create_ticket(&owner, "Needs discussion", "P2").await;
    let id = ticket["id"].as_str().unwrap();
    let comments_uri = format!("/tickets/{id}/comments");

    let (status, body) = app
        .send(
            Method::POST,
            &comments_uri,
            Some(&owner),
            Some(json!({ "body": "first" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticketId"], id);

    let (status, _) = app
        .send(
            Method::POST,
            &comments_uri,
            Some(&support),
            Some(json!({ "body": "second" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(
            Method::POST,
            &comments_uri,
            Some(&stranger),
            Some(json!({ "body": "drive-by" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to comment");

    let (status, body) = app
        .send(Method::POST, &comments_uri, Some(&owner), Some(json!({ "body": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["body"].is_array());

    let (status, body) = app
        .send(Method::GET, &format!("/tickets/{id}"), Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticket"]["id"], id);
    let bodies: Vec<_> = body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(bodies, vec!["first", "second"]);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new(false).await;
    let token = app.token("eng-a@example.com").await;

    for uri in [
        "/tickets/00000000-0000-4000-8000-000000000000",
        "/tickets/not-a-uuid",
        "/tickets/not-a-uuid/comments",
        "/kb/not-a-uuid",
        "/playbooks/00000000-0000-4000-8000-000000000000",
    ] {
        let (status, body) = app.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "not_found");
    }
}

#[tokio::test]
async fn ticket_delete_is_always_not_found() {
    let app = TestApp::new(false).await;
    let token = app.token("admin@example.com").await;

    for _ in 0..2 {
        let (status, body) = app
            .send(
                Method::DELETE,
                "/tickets/00000000-0000-4000-8000-000000000000",
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["statusCode"], 404);
    }

    // An existing ticket is not removed either.
    let ticket = app.create_ticket(&token, "Keep forever", "P3").await;
    let uri = format!("/tickets/{}", ticket["id"].as_str().unwrap());
    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn staff_assign_of_unknown_ticket_is_not_found() {
    let app = TestApp::new(false).await;
    let support = app.token("support@example.com").await;
    let missing = "/tickets/00000000-0000-4000-8000-000000000000";

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("{missing}/assign"),
            Some(&support),
            Some(json!({ "assigneeId": "support-queue" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ticket not found");

    let (status, _) = app
        .send(
            Method::PATCH,
            missing,
            Some(&support),
            Some(json!({ "status": "BLOCKED" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.send(Method::GET, "/tickets", Some(&support), None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn kb_roles_and_delete_semantics() {
    let app = TestApp::new(false).await;
    let eng = app.token("eng-a@example.com").await;
    let support = app.token("support@example.com").await;
    let admin = app.token("admin@example.com").await;

    let article = json!({
        "title": "Cline setup",
        "body": "Install the extension, then sign in.",
        "tags": ["a", "b"],
    });

    let (status, _) = app
        .send(Method::POST, "/kb", Some(&eng), Some(article.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .send(Method::POST, "/kb", Some(&support), Some(article))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["tags"], json!(["a", "b"]));
    let uri = format!("/kb/{}", created["id"].as_str().unwrap());

    let (status, body) = app.send(Method::GET, "/kb?tag=a", Some(&eng), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&support), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    for _ in 0..2 {
        let (status, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn playbook_crud() {
    let app = TestApp::new(false).await;
    let support = app.token("support@example.com").await;
    let admin = app.token("admin@example.com").await;

    let (status, created) = app
        .send(
            Method::POST,
            "/playbooks",
            Some(&support),
            Some(json!({
                "name": "Debug CI",
                "description": "Pipeline triage",
                "template": "Check {{job}} logs",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["tags"], json!([]));
    assert_eq!(created["template"], "Check {{job}} logs");
    let uri = format!("/playbooks/{}", created["id"].as_str().unwrap());

    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&support),
            Some(json!({ "description": null, "tags": ["ci"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["description"].is_null());
    assert_eq!(body["name"], "Debug CI");

    let (status, body) = app
        .send(Method::GET, "/playbooks?search=ci", Some(&support), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn suggest_is_hidden_when_flag_off() {
    let app = TestApp::new(false).await;
    let token = app.token("eng-a@example.com").await;
    let ticket = app.create_ticket(&token, "Suggest please", "P2").await;

    let uri = format!("/tickets/{}/suggest", ticket["id"].as_str().unwrap());
    let (status, body) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "AI Assist feature is not enabled");
}

#[tokio::test]
async fn suggest_returns_stub_when_flag_on() {
    let app = TestApp::new(true).await;
    let token = app.token("eng-a@example.com").await;
    let ticket = app.create_ticket(&token, "Suggest please", "P2").await;

    let uri = format!("/tickets/{}/suggest", ticket["id"].as_str().unwrap());
    let (status, body) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "stub-v1");
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
    assert_eq!(body["suggestions"][0]["type"], "kb_article");
    assert!(body["generatedAt"].is_string());

    let (status, _) = app
        .send(
            Method::POST,
            "/tickets/00000000-0000-4000-8000-000000000000/suggest",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
