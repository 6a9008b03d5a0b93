//! End-to-end dispatch against a local mock server.

use flix_client::{
    Client, ClientConfig, ClientOptions, ConnectionOptions, Credentials, HmacSha1Signer, HttpError,
    Method, Params, RequestOptions, StatusError,
};
use serde::Deserialize;
use std::io::{Cursor, Seek, Write};
use std::time::Duration;
use tokio::runtime::Runtime;
use url::Url;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock server kept alive on its own runtime so the blocking client can
/// be driven from the test thread.
struct TestServer {
    server: MockServer,
    runtime: Runtime,
}

impl TestServer {
    fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    fn uri(&self) -> String {
        self.server.uri()
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn received(&self) -> Vec<wiremock::Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}

fn credentials() -> Credentials {
    Credentials::new("ck", "cs", "token", "token-secret")
}

fn client_for(server: &TestServer) -> Client {
    Client::builder(ClientConfig {
        endpoint: Url::parse(&server.uri()).unwrap(),
        credentials: credentials(),
        ..ClientConfig::default()
    })
    .build()
}

fn header_str(request: &wiremock::Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Pull `oauth_*` fields out of an `OAuth k="v", ...` header.
fn oauth_field(header: &str, key: &str) -> Option<String> {
    header
        .strip_prefix("OAuth ")?
        .split(", ")
        .filter_map(|field| field.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim_matches('"').to_string())
}

#[derive(Debug, Deserialize, PartialEq)]
struct Title {
    id: u64,
    name: String,
}

#[test]
fn get_sends_query_and_valid_signature() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("q", "x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Heat"}
            ]))),
    );

    let client = client_for(&server);
    let response = client
        .get("/items", Params::new().with("q", "x"), RequestOptions::default())
        .unwrap();

    let titles: Vec<Title> = response.json().unwrap();
    assert_eq!(titles, vec![Title { id: 1, name: "Heat".to_string() }]);
    assert!(response.json.is_some());

    let received = server.received();
    assert_eq!(received.len(), 1);
    let request = &received[0];
    assert_eq!(request.method.as_str(), "GET");
    assert!(request.body.is_empty());

    let authorization = header_str(request, "authorization").unwrap();
    let nonce = oauth_field(&authorization, "oauth_nonce").unwrap();
    let timestamp: i64 = oauth_field(&authorization, "oauth_timestamp").unwrap().parse().unwrap();

    let creds = credentials();
    let expected = HmacSha1Signer::new().sign_with(
        Method::Get,
        &Url::parse(&format!("{}/items", server.uri())).unwrap(),
        &[("q".to_string(), "x".to_string())],
        &creds.signing().unwrap(),
        &nonce,
        timestamp,
    )
    .unwrap();
    assert_eq!(authorization, expected);
}

#[test]
fn post_sends_form_body() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("name=a"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 2}))),
    );

    let client = client_for(&server);
    let response = client
        .post("/items", Params::new().with("name", "a"), RequestOptions::default())
        .unwrap();

    assert_eq!(response.status.as_u16(), 201);
    assert_eq!(response.json, Some(serde_json::json!({"id": 2})));

    let request = &server.received()[0];
    assert!(header_str(request, "authorization").unwrap().starts_with("OAuth "));
    assert!(request.url.query().is_none());
}

#[test]
fn post_file_sends_multipart_body() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("POST"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({}))),
    );

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(b"poster bytes").unwrap();
    file.rewind().unwrap();

    let client = client_for(&server);
    client
        .post(
            "/items",
            Params::new().with("name", "a").file("poster", &file),
            RequestOptions::default(),
        )
        .unwrap();

    let request = &server.received()[0];
    assert!(header_str(request, "content-type")
        .unwrap()
        .starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"poster\""));
    assert!(body.contains("poster bytes"));
    assert!(body.contains("name=\"name\""));
}

#[test]
fn put_stream_sends_multipart_body() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("PUT"))
            .and(path("/items/1"))
            .respond_with(ResponseTemplate::new(204)),
    );

    let mut io = Cursor::new(b"trailer bytes".to_vec());
    let client = client_for(&server);
    let response = client
        .put("/items/1", Params::new().stream("trailer", &mut io), RequestOptions::default())
        .unwrap();

    assert_eq!(response.status.as_u16(), 204);
    assert!(response.json.is_none());
    let request = &server.received()[0];
    assert!(String::from_utf8_lossy(&request.body).contains("trailer bytes"));
}

#[test]
fn delete_without_credentials_sends_no_authorization() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("DELETE"))
            .and(path("/items/1"))
            .respond_with(ResponseTemplate::new(200)),
    );

    let client = Client::builder(ClientConfig {
        endpoint: Url::parse(&server.uri()).unwrap(),
        ..ClientConfig::default()
    })
    .build();
    client
        .delete("/items/1", Params::new(), RequestOptions::default())
        .unwrap();

    let request = &server.received()[0];
    assert!(header_str(request, "authorization").is_none());
}

#[test]
fn endpoint_override_reaches_the_other_server() {
    let primary = TestServer::start();
    let other = TestServer::start();
    for server in [&primary, &other] {
        server.mount(Mock::given(path("/items")).respond_with(ResponseTemplate::new(200)));
    }

    let client = client_for(&primary);
    client
        .get("/items", Params::new(), RequestOptions::new().endpoint(other.uri()))
        .unwrap();
    assert_eq!(other.received().len(), 1);
    assert!(primary.received().is_empty());

    client
        .get("/items", Params::new(), RequestOptions::default())
        .unwrap();
    assert_eq!(primary.received().len(), 1);
    assert_eq!(other.received().len(), 1);
}

#[test]
fn error_status_is_transport_error() {
    let server = TestServer::start();
    server.mount(
        Mock::given(path("/items/9")).respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "no such title"})),
        ),
    );

    let client = client_for(&server);
    let err = client
        .get("/items/9", Params::new(), RequestOptions::default())
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), Some(404));
    let HttpError::Transport { source, .. } = err else {
        panic!("Expected Transport error");
    };
    assert!(source
        .downcast_ref::<StatusError>()
        .unwrap()
        .body
        .contains("no such title"));
}

#[test]
fn malformed_json_is_decode_error() {
    let server = TestServer::start();
    server.mount(
        Mock::given(path("/items"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>")),
    );

    let client = client_for(&server);
    let err = client
        .get("/items", Params::new(), RequestOptions::default())
        .unwrap_err();

    assert!(err.is_decode());
    assert_eq!(err.status(), Some(200));
}

#[test]
fn connection_refused_is_transport_error() {
    let client = Client::builder(ClientConfig {
        endpoint: Url::parse("http://127.0.0.1:1").unwrap(),
        ..ClientConfig::default()
    })
    .build();

    let err = client
        .get("/items", Params::new(), RequestOptions::default())
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[test]
fn slow_response_times_out() {
    let server = TestServer::start();
    server.mount(
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3))),
    );

    let client = Client::builder(ClientConfig {
        endpoint: Url::parse(&server.uri()).unwrap(),
        connection: ConnectionOptions {
            request_timeout_secs: 1,
            ..ConnectionOptions::default()
        },
        ..ClientConfig::default()
    })
    .build();

    let err = client
        .get("/slow", Params::new(), RequestOptions::default())
        .unwrap_err();
    assert!(err.is_transport());
    assert!(err.is_timeout());
}

#[test]
fn customizer_adds_header() {
    let server = TestServer::start();
    server.mount(
        Mock::given(path("/items"))
            .and(header("x-request-id", "abc"))
            .respond_with(ResponseTemplate::new(200)),
    );

    let client = client_for(&server);
    let response = client
        .request_with(
            Method::Get,
            "/items",
            Params::new(),
            RequestOptions::default(),
            |request| {
                request.header("x-request-id", "abc");
            },
        )
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
}

#[test]
fn client_options_resolve_over_defaults() {
    let server = TestServer::start();
    server.mount(Mock::given(path("/items")).respond_with(ResponseTemplate::new(200)));

    let client = Client::new(
        ClientOptions::new()
            .endpoint(server.uri())
            .credentials(credentials()),
    )
    .unwrap();
    assert!(client.has_credentials());

    client
        .get("/items", Params::new(), RequestOptions::default())
        .unwrap();

    let request = &server.received()[0];
    assert!(header_str(request, "user-agent").unwrap().starts_with("flix/"));
    assert_eq!(header_str(request, "accept").as_deref(), Some("application/json"));
}
