#![allow(clippy::unwrap_used)]

//! Form controllers against a running gateway in front of a mock backend.

use authgate::{
    client::AuthClient,
    forms::{
        AlertKind, Dashboard, DashboardLoad, FormState, LoginForm, ResetLink, ResetPasswordForm,
        SignupForm, Submission, DASHBOARD_PATH, LOGIN_PATH,
    },
    gateway::{backend::parse_base_url, router, Backend, RememberMe},
    session::{FileStore, KeyValueStore, MemoryStore, SessionManager, REFRESH_TOKEN_KEY},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

/// Serve the gateway on an ephemeral port and return its base URL.
async fn gateway(backend: &MockServer) -> String {
    let backend = Backend::new(
        Some(parse_base_url(&backend.uri()).unwrap()),
        Duration::from_secs(2),
    )
    .unwrap();
    let app = router(Arc::new(backend), RememberMe::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    format!("http://{addr}")
}

async fn mount_login(backend: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .and(body_json(json!({"email": "a@b.co", "password": "password1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "A", "refresh": "R"})),
        )
        .mount(backend)
        .await;
}

#[tokio::test]
async fn signup_makes_exactly_one_backend_call() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signup/"))
        .and(body_json(json!({
            "email": "a@b.co",
            "password": "password1",
            "password2": "password1",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&backend)
        .await;

    let client = AuthClient::new(&gateway(&backend).await).unwrap();
    let mut signup = SignupForm::new(client);

    let submission = signup
        .submit("a@b.co", secret("password1"), secret("password1"))
        .await;

    assert_eq!(submission, Submission::Completed);
    assert_eq!(signup.form().state(), FormState::Success);
    let navigation = signup.form().navigation().unwrap();
    assert_eq!(navigation.to, LOGIN_PATH);
    assert_eq!(navigation.after, Duration::from_secs(2));
}

#[tokio::test]
async fn login_without_remember_me_keeps_refresh_in_session_scope() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;

    let session = SessionManager::new(MemoryStore::new(), MemoryStore::new());
    let client = AuthClient::new(&gateway(&backend).await).unwrap();
    let mut login = LoginForm::new(client, &session);

    login.submit("a@b.co", secret("password1"), false).await;

    assert_eq!(login.form().state(), FormState::Success);
    assert_eq!(
        login.form().navigation().map(|n| n.to.as_str()),
        Some(DASHBOARD_PATH)
    );
    assert_eq!(session.access_token().unwrap().expose_secret(), "A");
    assert_eq!(session.persistent().get(REFRESH_TOKEN_KEY), None);
    assert_eq!(
        session.session().get(REFRESH_TOKEN_KEY).as_deref(),
        Some("R")
    );
}

#[tokio::test]
async fn remembered_login_survives_a_restart() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    Mock::given(method("GET"))
        .and(path("/api/user/"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "a@b.co"})))
        .mount(&backend)
        .await;

    let file = std::env::temp_dir()
        .join(format!("authgate-flows-{}", ulid::Ulid::new()))
        .join("session.json");
    let base = gateway(&backend).await;

    {
        let session = SessionManager::new(FileStore::open(&file).unwrap(), MemoryStore::new());
        let mut login = LoginForm::new(AuthClient::new(&base).unwrap(), &session);
        login.submit("a@b.co", secret("password1"), true).await;
        assert_eq!(login.form().state(), FormState::Success);
    }

    // new process: fresh session scope, same persistent file
    let session = SessionManager::new(FileStore::open(&file).unwrap(), MemoryStore::new());
    assert_eq!(session.refresh_token().unwrap().expose_secret(), "R");

    let dashboard = Dashboard::new(AuthClient::new(&base).unwrap(), &session);
    assert_eq!(
        dashboard.load().await,
        DashboardLoad::User(json!({"email": "a@b.co"}))
    );

    dashboard.logout().unwrap();
    let session = SessionManager::new(FileStore::open(&file).unwrap(), MemoryStore::new());
    assert!(session.access_token().is_none());
    assert!(session.refresh_token().is_none());

    let _ = std::fs::remove_dir_all(file.parent().unwrap());
}

#[tokio::test]
async fn backend_rejection_reaches_the_login_alert() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "No active account found"})),
        )
        .mount(&backend)
        .await;

    let session = SessionManager::new(MemoryStore::new(), MemoryStore::new());
    let client = AuthClient::new(&gateway(&backend).await).unwrap();
    let mut login = LoginForm::new(client, &session);

    login.submit("a@b.co", secret("password1"), false).await;

    let alert = login.form().alert().unwrap();
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(alert.message, "No active account found");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn reset_link_flows_through_to_backend_path() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reset-password/MQ/set-password/"))
        .and(body_json(json!({"password": "password1", "password2": "password1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&backend)
        .await;

    let client = AuthClient::new(&gateway(&backend).await).unwrap();
    let mut reset = ResetPasswordForm::new(
        client,
        ResetLink::parse("https://app.example.com/reset-password?uid=MQ&token=set-password"),
    );

    reset.submit(secret("password1"), secret("password1")).await;

    assert_eq!(reset.form().state(), FormState::Success);
    assert_eq!(
        reset.form().navigation().map(|n| n.after),
        Some(Duration::from_secs(3))
    );
}
