//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web};

use crate::domain::ports::AccountAdministration;
use crate::domain::{AccountService, EmailPolicy};
use crate::inbound::http::state::{HttpState, Repositories, ServiceSettings};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::Argon2PasswordHasher;
use crate::test_support::fixture_clock;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// HTTP state over a fresh in-memory store, plus the store itself.
pub fn memory_state() -> (web::Data<HttpState>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = HttpState::from_repositories(
        Repositories {
            accounts: store.clone(),
            departments: store.clone(),
            questions: store.clone(),
            answers: store.clone(),
            votes: store.clone(),
            flags: store.clone(),
        },
        ServiceSettings {
            hasher: Arc::new(Argon2PasswordHasher),
            email_policy: EmailPolicy::default(),
            clock: fixture_clock(),
        },
    );
    (web::Data::new(state), store)
}

/// Registration payload for roll number `1602-18-733-0NN`.
pub fn registration_body(n: u8) -> serde_json::Value {
    serde_json::json!({
        "email": format!("1602-18-733-{n:03}@vce.ac.in"),
        "username": format!("student{n}"),
        "firstName": "Asha",
        "lastName": "Reddy",
        "dateOfBirth": "2000-01-15",
        "gradYear": 2022,
        "rollNumber": format!("1602-18-733-{n:03}"),
        "phone": format!("98765432{n:02}"),
        "department": 1,
        "password": "hunter2",
    })
}

/// Register and activate account `n`, log in, and return its id with the
/// session cookie.
pub async fn signed_in<S>(
    app: &S,
    store: &Arc<InMemoryStore>,
    n: u8,
) -> (String, Cookie<'static>)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let created = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(registration_body(n))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(created).await;
    let id = body["id"].as_str().expect("account id").to_owned();

    let admin = AccountService::new(
        store.clone(),
        store.clone(),
        Arc::new(Argon2PasswordHasher),
        EmailPolicy::default(),
        fixture_clock(),
    );
    admin
        .set_active(&format!("1602-18-733-{n:03}"), true)
        .await
        .expect("activate account");

    let login = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({
                "rollNumber": format!("1602-18-733-{n:03}"),
                "password": "hunter2",
            }))
            .to_request(),
    )
    .await;
    assert!(login.status().is_success(), "login failed: {}", login.status());
    let cookie = login
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();
    (id, cookie)
}
