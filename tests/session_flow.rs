//! End-to-end session flow over a real listener.

use anyhow::{Context, Result};
use gatehouse::{
    gateway,
    session::{SessionAuthority, SessionRegistry},
    store::{CredentialStore, MemoryCredentialStore},
};
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_server() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    let secret = SecretString::from("end-to-end-secret-that-is-long-enough".to_string());
    let authority = Arc::new(SessionAuthority::new(&secret, SessionRegistry::new())?);
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
    let app = gateway::router(authority, store);

    tokio::spawn(async move {
        if let Err(err) = gateway::serve(listener, app).await {
            eprintln!("test server failed: {err}");
        }
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn login_logout_login_over_http() -> Result<()> {
    let base = spawn_server().await?;
    let client = Client::builder().user_agent(gatehouse::APP_USER_AGENT).build()?;

    let response = client
        .post(format!("{base}/api/v1/register"))
        .json(&json!({"username": "judy", "email": "judy@example.com", "password": "s3cret-pass"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let credentials = json!({"email": "judy@example.com", "password": "s3cret-pass"});
    let response = client
        .post(format!("{base}/api/v1/login"))
        .json(&credentials)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let first = body["token"].as_str().context("missing token")?.to_string();

    let response = client
        .post(format!("{base}/api/v1/login"))
        .json(&credentials)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{base}/api/v1/user/profile"))
        .bearer_auth(&first)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = client
        .post(format!("{base}/api/v1/logout"))
        .bearer_auth(&first)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{base}/api/v1/login"))
        .json(&credentials)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let second = body["token"].as_str().context("missing token")?;
    assert_ne!(first, second);

    let response = client
        .get(format!("{base}/api/v1/user/profile"))
        .bearer_auth(&first)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn health_over_http() -> Result<()> {
    let base = spawn_server().await?;
    let response = Client::new().get(format!("{base}/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await?;
    assert_eq!(body["database"], "ok");
    assert_eq!(body["active_sessions"], 0);
    Ok(())
}
