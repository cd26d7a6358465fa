#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::{assertions::ResponseAssertion, setup::TestApp};

/// A registered, logged-in account
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestApp {
    /// Send a request through the router, optionally with a bearer token and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, token: &str) -> ResponseAssertion {
        ResponseAssertion::from_response(self.send(Method::GET, uri, Some(token), None).await)
            .await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> ResponseAssertion {
        ResponseAssertion::from_response(self.send(Method::POST, uri, Some(token), body).await)
            .await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> ResponseAssertion {
        ResponseAssertion::from_response(
            self.send(Method::PUT, uri, Some(token), Some(body)).await,
        )
        .await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> ResponseAssertion {
        ResponseAssertion::from_response(self.send(Method::DELETE, uri, Some(token), None).await)
            .await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Register an account through the public endpoint
    pub async fn register(&self, email: &str, password: &str) -> ResponseAssertion {
        let body = json!({
            "email": email,
            "firstName": "Yogi",
            "lastName": "Student",
            "password": password,
        });
        ResponseAssertion::from_response(
            self.send(Method::POST, "/api/auth/register", None, Some(body))
                .await,
        )
        .await
    }

    /// Log in through the public endpoint
    pub async fn login(&self, email: &str, password: &str) -> ResponseAssertion {
        let body = json!({ "email": email, "password": password });
        ResponseAssertion::from_response(
            self.send(Method::POST, "/api/auth/login", None, Some(body))
                .await,
        )
        .await
    }

    /// Register then log in, returning the bearer token and account id
    pub async fn signed_in_user(&self, email: &str) -> TestUser {
        self.register(email, "test!1234").await.assert_ok();
        let jwt = self.login(email, "test!1234").await.assert_ok().json();

        TestUser {
            id: jwt["id"].as_i64().unwrap(),
            email: email.to_string(),
            token: jwt["token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a session taught by the first seeded teacher
    pub async fn create_session(&self, user: &TestUser, name: &str) -> Value {
        let body = session_body(name, self.teacher_ids[0], vec![]);
        self.post("/api/session", &user.token, Some(body))
            .await
            .assert_ok()
            .json()
    }
}

/// JSON payload for the session create/update endpoints
pub fn session_body(name: &str, teacher_id: i64, users: Vec<i64>) -> Value {
    json!({
        "name": name,
        "date": "2026-03-01T09:30:00Z",
        "teacher_id": teacher_id,
        "users": users,
        "description": "Morning vinyasa flow for all levels",
    })
}
