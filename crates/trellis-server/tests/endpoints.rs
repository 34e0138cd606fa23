//! End-to-end dispatch tests.
//!
//! These exercise registration and the full pipeline through
//! [`Server::dispatch`] without opening sockets: a plain GET endpoint, a
//! POST endpoint with query and body schemas, and Basic/Bearer protected
//! endpoints.

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value};

use trellis_auth::{BasicScheme, BearerScheme};
use trellis_core::{
    Endpoint, EndpointMeta, HandlerArgs, Json, NoBody, NoQuery, Query, Reply, ResponseModel,
    Unauthenticated,
};
use trellis_server::{HttpResponse, Server, ServerBuilder, ServerConfig};

#[derive(Debug, Deserialize)]
struct MockQuery {
    time: String,
}

#[derive(Debug, Deserialize)]
struct MockBody {
    age: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Caller {
    subject: String,
}

fn request(method: Method, uri: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .expect("request should build")
}

fn request_with_body(method: Method, uri: &str, body: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::from(body.to_string()))
        .expect("request should build")
}

fn authorized(method: Method, uri: &str, authorization: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", authorization)
        .body(Bytes::new())
        .expect("request should build")
}

async fn body_json(response: HttpResponse) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn body_bytes(response: HttpResponse) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
}

fn build_server() -> Server {
    ServerBuilder::new(ServerConfig::default())
        .endpoint(
            Endpoint::get("/test")
                .expect("path should parse")
                .meta(EndpointMeta::new("getTest", "Plain test endpoint"))
                .response(StatusCode::OK, ResponseModel::json()),
            |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
                Reply::json(StatusCode::OK, &json!({ "code": 200, "data": "test" }))
            },
        )
        .expect("registration should succeed")
        .endpoint(
            Endpoint::post("/mock")
                .expect("path should parse")
                .meta(EndpointMeta::new("postMock", "Mock creation endpoint"))
                .query::<MockQuery>(json!({
                    "type": "object",
                    "properties": {
                        "time": { "type": "string", "format": "date-time" },
                    },
                    "required": ["time"],
                }))
                .expect("query schema should compile")
                .body::<MockBody>(json!({
                    "type": "object",
                    "properties": {
                        "age": { "type": "number" },
                    },
                    "required": ["age"],
                }))
                .expect("body schema should compile")
                .response(StatusCode::OK, ResponseModel::json()),
            |args: HandlerArgs<Json<MockBody>, Query<MockQuery>, Unauthenticated>| async move {
                Reply::json(
                    StatusCode::OK,
                    &json!({ "age": args.body.age, "time": args.query.time }),
                )
            },
        )
        .expect("registration should succeed")
        .endpoint(
            Endpoint::get("/secure/basic")
                .expect("path should parse")
                .meta(EndpointMeta::new("getSecureBasic", "Basic-protected"))
                .security(BasicScheme::new(|user, password| async move {
                    (user == "Test" && password == "TestPW").then(|| Caller { subject: user })
                })),
            |args: HandlerArgs<NoBody, NoQuery, Caller>| async move {
                Reply::json(StatusCode::OK, &json!({ "subject": args.caller.subject }))
            },
        )
        .expect("registration should succeed")
        .endpoint(
            Endpoint::get("/secure/bearer")
                .expect("path should parse")
                .meta(EndpointMeta::new("getSecureBearer", "Bearer-protected"))
                .security(BearerScheme::new(|token| async move {
                    (token == "TestToken123").then(|| Caller {
                        subject: "token-caller".to_string(),
                    })
                })),
            |args: HandlerArgs<NoBody, NoQuery, Caller>| async move {
                Reply::json(StatusCode::OK, &json!({ "subject": args.caller.subject }))
            },
        )
        .expect("registration should succeed")
        .endpoint(
            Endpoint::get("/items/:itemId")
                .expect("path should parse")
                .meta(EndpointMeta::new("getItem", "Path parameter echo")),
            |args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async move {
                let id = args.params.get("itemId").unwrap_or_default().to_string();
                Reply::json(StatusCode::OK, &json!({ "id": id }))
            },
        )
        .expect("registration should succeed")
        .build()
}

#[tokio::test]
async fn get_test_returns_declared_payload() {
    let server = build_server();

    let response = server.dispatch(request(Method::GET, "/test")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(
        body_json(response).await,
        json!({ "code": 200, "data": "test" })
    );
}

#[tokio::test]
async fn post_mock_accepts_valid_query_and_body() {
    let server = build_server();

    let response = server
        .dispatch(request_with_body(
            Method::POST,
            "/mock?time=2023-05-01T12%3A30%3A00Z",
            r#"{"age": 30}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "age": 30.0, "time": "2023-05-01T12:30:00Z" })
    );
}

#[tokio::test]
async fn post_mock_rejects_malformed_time() {
    let server = build_server();

    let response = server
        .dispatch(request_with_body(
            Method::POST,
            "/mock?time=yesterday",
            r#"{"age": 30}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Query parameters invalid");
    assert!(!body["error"]["issues"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn post_mock_rejects_missing_time() {
    let server = build_server();

    let response = server
        .dispatch(request_with_body(Method::POST, "/mock", r#"{"age": 30}"#))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Query parameters invalid");
}

#[tokio::test]
async fn post_mock_rejects_non_numeric_age() {
    let server = build_server();

    let response = server
        .dispatch(request_with_body(
            Method::POST,
            "/mock?time=2023-05-01T12%3A30%3A00Z",
            r#"{"age": "thirty"}"#,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Body invalid");
    let issues = body["error"]["issues"].as_array().unwrap();
    assert_eq!(issues[0]["path"], "/age");
}

#[tokio::test]
async fn post_mock_rejects_unparseable_body() {
    let server = build_server();

    let response = server
        .dispatch(request_with_body(
            Method::POST,
            "/mock?time=2023-05-01T12%3A30%3A00Z",
            "{not json",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Body invalid");
}

#[tokio::test]
async fn query_validation_runs_before_body_validation() {
    let server = build_server();

    // Both query and body are invalid; the query failure wins.
    let response = server
        .dispatch(request_with_body(
            Method::POST,
            "/mock?time=nope",
            "{not json",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Query parameters invalid");
}

#[tokio::test]
async fn basic_auth_accepts_valid_credentials() {
    let server = build_server();

    // base64("Test:TestPW")
    let response = server
        .dispatch(authorized(
            Method::GET,
            "/secure/basic",
            "Basic VGVzdDpUZXN0UFc=",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "subject": "Test" }));
}

#[tokio::test]
async fn basic_auth_rejects_wrong_password_with_empty_401() {
    let server = build_server();

    // base64("Test:wrong")
    let response = server
        .dispatch(authorized(
            Method::GET,
            "/secure/basic",
            "Basic VGVzdDp3cm9uZw==",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn basic_auth_rejects_missing_header() {
    let server = build_server();

    let response = server.dispatch(request(Method::GET, "/secure/basic")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn bearer_auth_accepts_valid_token() {
    let server = build_server();

    let response = server
        .dispatch(authorized(
            Method::GET,
            "/secure/bearer",
            "Bearer TestToken123",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "subject": "token-caller" })
    );
}

#[tokio::test]
async fn bearer_auth_rejects_wrong_token() {
    let server = build_server();

    let response = server
        .dispatch(authorized(
            Method::GET,
            "/secure/bearer",
            "Bearer WrongToken",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn bearer_endpoint_rejects_basic_credentials() {
    let server = build_server();

    // Credential format does not match the declared scheme.
    let response = server
        .dispatch(authorized(
            Method::GET,
            "/secure/bearer",
            "Basic VGVzdDpUZXN0UFc=",
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn mixed_schemes_take_first_match() {
    let server = ServerBuilder::new(ServerConfig::default())
        .endpoint(
            Endpoint::get("/either")
                .expect("path should parse")
                .security(BasicScheme::new(|user, password| async move {
                    (user == "Test" && password == "TestPW").then(|| Caller { subject: user })
                }))
                .or_security(BearerScheme::new(|token| async move {
                    (token == "TestToken123").then(|| Caller {
                        subject: "token-caller".to_string(),
                    })
                })),
            |args: HandlerArgs<NoBody, NoQuery, Caller>| async move {
                Reply::json(StatusCode::OK, &json!({ "subject": args.caller.subject }))
            },
        )
        .expect("registration should succeed")
        .build();

    let response = server
        .dispatch(authorized(Method::GET, "/either", "Basic VGVzdDpUZXN0UFc="))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "subject": "Test" }));

    let response = server
        .dispatch(authorized(Method::GET, "/either", "Bearer TestToken123"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "subject": "token-caller" })
    );

    let response = server
        .dispatch(authorized(Method::GET, "/either", "Digest whatever"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn path_parameters_reach_the_handler() {
    let server = build_server();

    let response = server.dispatch(request(Method::GET, "/items/abc-123")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "id": "abc-123" }));
}

#[tokio::test]
async fn unknown_path_is_json_404() {
    let server = build_server();

    let response = server.dispatch(request(Method::GET, "/nowhere")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Not found");
}
