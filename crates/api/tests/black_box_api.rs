use reqwest::StatusCode;
use serde_json::json;

const PASSWORD: &str = "password123";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = rolegate_api::app::build_app(rolegate_api::app::Settings::default()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client() -> reqwest::Client {
    // Redirects are the behavior under test; never follow them.
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    first: &str,
    last: &str,
    email: &str,
    role: Option<&str>,
) -> serde_json::Value {
    let mut body = json!({
        "first_name": first,
        "last_name": last,
        "email": email,
        "password": PASSWORD,
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }

    let res = client
        .post(format!("{base_url}/auth/register"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    body["user"].clone()
}

async fn login(client: &reqwest::Client, base_url: &str, email: &str) -> String {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    first: &str,
    last: &str,
    email: &str,
    role: Option<&str>,
) -> String {
    register(client, base_url, first, last, email, role).await;
    login(client, base_url, email).await
}

fn location(res: &reqwest::Response) -> &str {
    res.headers()
        .get(reqwest::header::LOCATION)
        .expect("redirect without Location header")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = client()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_validates_input() {
    let srv = TestServer::spawn().await;
    let client = client();

    // Missing name parts
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "email": "a@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Email, password, first name, and last name are required"
    );
    assert_eq!(body["success"], false);

    // A composed display name is no substitute for the name parts.
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Email, password, first name, and last name are required"
    );

    // One name part alone is not enough either.
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "first_name": "Ada",
            "email": "ada@example.com",
            "password": PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Email, password, first name, and last name are required"
    );

    // Malformed email
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "not-an-email",
            "password": PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email format");

    // Too-short password
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": "short",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Password must be at least 8 characters long");

    // Unknown role label
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": PASSWORD,
            "role": "owner",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown role: 'owner'");
}

#[tokio::test]
async fn register_login_me_logout_flow() {
    let srv = TestServer::spawn().await;
    let client = client();

    let user = register(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None).await;
    assert_eq!(user["role"], "user");
    assert_eq!(user["email"], "ada@example.com");
    // Name and display name are composed from the submitted parts.
    assert_eq!(user["name"], "Ada Lovelace");
    assert_eq!(user["first_name"], "Ada");
    assert_eq!(user["last_name"], "Lovelace");
    assert_eq!(user["display_name"], "Ada Lovelace");

    let token = login(&client, &srv.base_url, "ada@example.com").await;

    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "user");

    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Session is gone after logout.
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    let client = client();

    register(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None).await;

    // Wrong password for a real account.
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: serde_json::Value = res.json().await.unwrap();

    // Account that does not exist at all.
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "ghost@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: serde_json::Value = res.json().await.unwrap();

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["error"], "Invalid login credentials");
}

#[tokio::test]
async fn anonymous_page_requests_redirect_to_signin() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/auth/signin?callbackUrl=%2Fdashboard");

    // Deeper paths keep the full callback.
    let res = client
        .get(format!("{}/admin/users/42", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&res),
        "/auth/signin?callbackUrl=%2Fadmin%2Fusers%2F42"
    );
}

#[tokio::test]
async fn unknown_paths_still_require_auth() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .get(format!("{}/no/such/page", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/auth/signin?callbackUrl=%2Fno%2Fsuch%2Fpage");

    // Signed in, the same path is allowed through and simply does not exist.
    let token =
        register_and_login(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None)
            .await;
    let res = client
        .get(format!("{}/no/such/page", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signed_in_users_bounce_off_auth_pages() {
    let srv = TestServer::spawn().await;
    let client = client();

    // Anonymous requests see the signin page.
    let res = client
        .get(format!("{}/auth/signin", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let token =
        register_and_login(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None)
            .await;

    let res = client
        .get(format!("{}/auth/signin", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard");

    let res = client
        .get(format!("{}/auth/signup", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard");
}

#[tokio::test]
async fn dashboard_shows_role_copy_and_capabilities() {
    let srv = TestServer::spawn().await;
    let client = client();

    let token =
        register_and_login(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None)
            .await;

    let res = client
        .get(format!("{}/dashboard", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "user");
    assert_eq!(body["description"], "Can read and browse published content");
    assert_eq!(body["permissions"]["can_read"], true);
    assert_eq!(body["permissions"]["can_write"], false);
    assert_eq!(body["permissions"]["can_manage_users"], false);
}

#[tokio::test]
async fn admin_page_needs_admin_tier() {
    let srv = TestServer::spawn().await;
    let client = client();

    let user_token =
        register_and_login(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None)
            .await;

    // Plain users are turned back with the denial code in the query string.
    let res = client
        .get(format!("{}/admin", srv.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard?error=insufficient-permissions");

    let admin_token = register_and_login(
        &client,
        &srv.base_url,
        "Grace",
        "Hopper",
        "root@example.com",
        Some("admin"),
    )
    .await;

    let res = client
        .get(format!("{}/admin", srv.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["page"], "admin");
    // Admins see the page but do not hold the user-management capability.
    assert_eq!(body["can_manage_users"], false);
}

#[tokio::test]
async fn user_management_is_capability_gated() {
    let srv = TestServer::spawn().await;
    let client = client();

    let target = register(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None).await;
    let target_id = target["id"].as_str().unwrap().to_string();
    let target_token = login(&client, &srv.base_url, "ada@example.com").await;

    // Admins pass the route guard but fail the capability check.
    let admin_token = register_and_login(
        &client,
        &srv.base_url,
        "Alan",
        "Turing",
        "mod@example.com",
        Some("admin"),
    )
    .await;
    let res = client
        .get(format!("{}/admin/users", srv.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Superadmins hold the capability.
    let super_token = register_and_login(
        &client,
        &srv.base_url,
        "Grace",
        "Hopper",
        "root@example.com",
        Some("superadmin"),
    )
    .await;
    let res = client
        .get(format!("{}/admin/users", srv.base_url))
        .bearer_auth(&super_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["count"].as_u64().unwrap() >= 3);

    // Promote the target; their live session picks the new role up at once.
    let res = client
        .post(format!("{}/admin/users/{}/role", srv.base_url, target_id))
        .bearer_auth(&super_token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["role"], "admin");

    let res = client
        .get(format!("{}/admin", srv.base_url))
        .bearer_auth(&target_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn deactivation_revokes_live_sessions() {
    let srv = TestServer::spawn().await;
    let client = client();

    let target = register(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None).await;
    let target_id = target["id"].as_str().unwrap().to_string();
    let target_token = login(&client, &srv.base_url, "ada@example.com").await;

    let super_token = register_and_login(
        &client,
        &srv.base_url,
        "Grace",
        "Hopper",
        "root@example.com",
        Some("superadmin"),
    )
    .await;

    let res = client
        .post(format!(
            "{}/admin/users/{}/deactivate",
            srv.base_url, target_id
        ))
        .bearer_auth(&super_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The live session no longer resolves.
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(&target_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // And fresh sign-ins are rejected.
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Account is inactive or not found");

    // Reactivation restores sign-in.
    let res = client
        .post(format!(
            "{}/admin/users/{}/activate",
            srv.base_url, target_id
        ))
        .bearer_auth(&super_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    login(&client, &srv.base_url, "ada@example.com").await;
}

#[tokio::test]
async fn profile_update_and_password_change() {
    let srv = TestServer::spawn().await;
    let client = client();

    let token =
        register_and_login(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None)
            .await;

    // Empty patch is rejected.
    let res = client
        .patch(format!("{}/profile", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "No fields to update");

    let res = client
        .patch(format!("{}/profile", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "bio": "Writes Rust.", "display_name": "ada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["bio"], "Writes Rust.");
    assert_eq!(body["user"]["display_name"], "ada");

    // Wrong current password.
    let res = client
        .post(format!("{}/profile/password", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "current_password": "nope-nope", "new_password": "even-better-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Current password is incorrect");

    let res = client
        .post(format!("{}/profile/password", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "current_password": PASSWORD, "new_password": "even-better-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Old password is dead, new one works.
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": "even-better-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn authz_introspection_explains_decisions() {
    let srv = TestServer::spawn().await;
    let client = client();

    let admin_token = register_and_login(
        &client,
        &srv.base_url,
        "Alan",
        "Turing",
        "mod@example.com",
        Some("admin"),
    )
    .await;

    let res = client
        .get(format!("{}/admin/authz/roles", srv.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["roles"].as_array().unwrap().len(), 3);

    // A plain user probing /admin would be turned back.
    let res = client
        .get(format!("{}/admin/authz/explain", srv.base_url))
        .query(&[("path", "/admin"), ("role", "user")])
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["trace"]["public"], false);
    assert_eq!(body["trace"]["decision"]["decision"], "to_dashboard");

    // Anonymous probe of a protected page points at signin.
    let res = client
        .get(format!("{}/admin/authz/explain", srv.base_url))
        .query(&[("path", "/dashboard")])
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["trace"]["decision"]["decision"], "to_signin");
    assert_eq!(body["trace"]["decision"]["callback"], "/dashboard");
}

#[tokio::test]
async fn auth_events_stream_requires_capability() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client
        .get(format!("{}/auth/events", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let user_token =
        register_and_login(&client, &srv.base_url, "Ada", "Lovelace", "ada@example.com", None)
            .await;
    let res = client
        .get(format!("{}/auth/events", srv.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let super_token = register_and_login(
        &client,
        &srv.base_url,
        "Grace",
        "Hopper",
        "root@example.com",
        Some("superadmin"),
    )
    .await;
    let res = client
        .get(format!("{}/auth/events", srv.base_url))
        .bearer_auth(&super_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}
