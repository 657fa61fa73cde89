//! Runs against a live server with a seeded database:
//!
//! ```sh
//! E2E_USERNAME=budi01 E2E_PASSWORD=... cargo test --test integration_login_e2e -- --ignored
//! ```

use serde_json::{Value, json};

// Shared test context
struct TestContext {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap(),
            base_url: std::env::var("E2E_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
            username: std::env::var("E2E_USERNAME").unwrap_or_else(|_| "budi01".to_string()),
            password: std::env::var("E2E_PASSWORD").unwrap_or_else(|_| "rahasia".to_string()),
        }
    }

    async fn first_term(&self) -> String {
        let response = self
            .client
            .get(format!("{}/api/auth/terms", self.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200, "Terms unavailable");

        let body: Value = response.json().await.unwrap();
        body["terms"][0].as_str().expect("at least one term").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "needs a running server and a seeded database"]
    async fn test_login_session_and_logout() {
        let context = TestContext::new();
        let term = context.first_term().await;

        // Step 1: Login
        let login_response = context
            .client
            .post(format!("{}/api/auth/login", context.base_url))
            .json(&json!({
                "username": context.username,
                "password": context.password,
                "term": term,
                "remember_me": true
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(login_response.status().as_u16(), 200, "Login failed");
        assert!(
            login_response.cookies().any(|c| c.name() == "erapor_session"),
            "Session cookie not found in login response"
        );
        let login_body: Value = login_response.json().await.unwrap();
        assert_eq!(login_body["authenticated"], true);
        assert_eq!(login_body["term"], term.as_str());

        // Step 2: Rehydrate
        let session_response = context
            .client
            .get(format!("{}/api/auth/session", context.base_url))
            .send()
            .await
            .unwrap();
        let session_body: Value = session_response.json().await.unwrap();
        assert_eq!(session_body["authenticated"], true);
        assert_eq!(session_body["view"], login_body["view"]);

        // Step 3: Menu
        let menu_response = context
            .client
            .get(format!("{}/api/navigation/menu", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(menu_response.status().as_u16(), 200, "Menu failed");

        // Step 4: Logout
        let logout_response = context
            .client
            .post(format!("{}/api/auth/logout", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(logout_response.status().as_u16(), 200, "Logout failed");

        let menu_response = context
            .client
            .get(format!("{}/api/navigation/menu", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(menu_response.status().as_u16(), 401);
    }

    #[tokio::test]
    #[ignore = "needs a running server and a seeded database"]
    async fn test_missing_term_is_rejected() {
        let context = TestContext::new();

        let response = context
            .client
            .post(format!("{}/api/auth/login", context.base_url))
            .json(&json!({
                "username": context.username,
                "password": context.password
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["field"], "term");
    }
}
