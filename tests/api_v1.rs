use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use token_service::api;
use token_service::server::Server;
use token_service::settings::parse_settings_str;
use warp::Filter;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;

const SETTINGS: &str = r#"
[http]
address = "127.0.0.1:0"

[identity]
backend = "fake"

[jwt]
key = "api-test-secret"
access_ttl = 15
refresh_ttl = 10080

[log]
filter = "warn"

[store]
backend = "memory"
users = [{ email = "ada@example.com", id = 42 }]
"#;

async fn app() -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let settings = parse_settings_str(SETTINGS).unwrap();
    let server = Arc::new(Server::try_new(&settings).await.unwrap());
    api::routes(server)
}

fn body(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn error_code(bytes: &Bytes) -> String {
    let value = body(bytes);
    assert_eq!(value["success"], json!(false));
    value["error"]["code"].as_str().unwrap().to_string()
}

async fn login<F>(app: &F) -> (String, String)
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let resp = warp::test::request()
        .method("POST")
        .path("/backend/v1/tokens")
        .json(&json!({ "token": "fake-id-token:ada@example.com" }))
        .reply(app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let value = body(resp.body());
    assert_eq!(value["success"], json!(true));
    let access = value["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = value["data"]["refreshToken"].as_str().unwrap().to_string();
    (access, refresh)
}

#[tokio::test]
async fn generate_refresh_invalidate() {
    let app = app().await;
    let (access, refresh) = login(&app).await;

    let resp = warp::test::request()
        .method("PUT")
        .path("/backend/v1/tokens/self")
        .json(&json!({ "refreshToken": refresh }))
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let refreshed = body(resp.body())["data"]["accessToken"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(refreshed, access);

    let resp = warp::test::request()
        .method("DELETE")
        .path("/backend/v1/tokens/self")
        .header("authorization", format!("Bearer {}", refreshed))
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = warp::test::request()
        .method("PUT")
        .path("/backend/v1/tokens/self")
        .json(&json!({ "refreshToken": refresh }))
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp.body()), "Unauthenticated");
}

#[tokio::test]
async fn second_login_supersedes_first_refresh_token() {
    let app = app().await;
    let (_, first_refresh) = login(&app).await;
    let (_, second_refresh) = login(&app).await;

    let resp = warp::test::request()
        .method("PUT")
        .path("/backend/v1/tokens/self")
        .json(&json!({ "refreshToken": first_refresh }))
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp.body()), "Unauthenticated");

    let resp = warp::test::request()
        .method("PUT")
        .path("/backend/v1/tokens/self")
        .json(&json!({ "refreshToken": second_refresh }))
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalidate_twice_is_no_content() {
    let app = app().await;
    let (access, _) = login(&app).await;

    for _ in 0..2 {
        let resp = warp::test::request()
            .method("DELETE")
            .path("/backend/v1/tokens/self")
            .header("authorization", format!("Bearer {}", access))
            .reply(&app)
            .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn unknown_identity_is_not_found() {
    let app = app().await;
    let resp = warp::test::request()
        .method("POST")
        .path("/backend/v1/tokens")
        .json(&json!({ "token": "fake-id-token:eve@example.com" }))
        .reply(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(resp.body()), "UnknownSubject");
}

#[tokio::test]
async fn rejected_credential_is_unauthorized() {
    let app = app().await;
    let resp = warp::test::request()
        .method("POST")
        .path("/backend/v1/tokens")
        .json(&json!({ "token": "not-an-id-token" }))
        .reply(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp.body()), "InvalidCredential");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app().await;
    let resp = warp::test::request()
        .method("POST")
        .path("/backend/v1/tokens")
        .header("content-type", "application/json")
        .body("{\"tok")
        .reply(&app)
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp.body()), "BadRequest");
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let app = app().await;
    let (access, _) = login(&app).await;

    let resp = warp::test::request()
        .method("PUT")
        .path("/backend/v1/tokens/self")
        .json(&json!({ "refreshToken": access }))
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalidate_requires_access_bearer() {
    let app = app().await;
    let (_, refresh) = login(&app).await;

    let resp = warp::test::request()
        .method("DELETE")
        .path("/backend/v1/tokens/self")
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp.body()), "Unauthenticated");

    for header in [format!("Bearer {}", refresh), format!("Basic {}", refresh)] {
        let resp = warp::test::request()
            .method("DELETE")
            .path("/backend/v1/tokens/self")
            .header("authorization", header)
            .reply(&app)
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let app = app().await;

    let resp = warp::test::request()
        .method("GET")
        .path("/backend/v1/sessions")
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(resp.body()), "NotFound");

    let resp = warp::test::request()
        .method("GET")
        .path("/backend/v1/tokens/self")
        .reply(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
