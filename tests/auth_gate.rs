use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use book_club_hub::auth::{generate_jwt, ExtractAuth, TOKEN_LIFETIME};
use tower::ServiceExt;

fn test_app() -> Router {
    // base64 of a throwaway test secret
    std::env::set_var("JWT_SECRET", "dGVzdC1zZWNyZXQ=");
    Router::new().route(
        "/whoami",
        get(|ExtractAuth(claims): ExtractAuth| async move { claims.username }),
    )
}

fn get_whoami(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/whoami");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn missing_token_yields_401() {
    let response = test_app().oneshot(get_whoami(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_authorization_yields_401() {
    let request = Request::builder()
        .uri("/whoami")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_yields_403() {
    let response = test_app()
        .oneshot(get_whoami(Some("not.a.token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tampered_token_yields_403() {
    let app = test_app();
    let token = generate_jwt(1, "reader", TOKEN_LIFETIME).unwrap();
    // break the signature
    let mut tampered = token[..token.len() - 2].to_string();
    tampered.push_str("xx");
    let response = app.oneshot(get_whoami(Some(&tampered))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn valid_token_passes_claims_to_the_handler() {
    let app = test_app();
    let token = generate_jwt(7, "bookworm", TOKEN_LIFETIME).unwrap();
    let response = app.oneshot(get_whoami(Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert_eq!(&body[..], b"bookworm");
}
