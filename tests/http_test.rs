//! HTTP surface tests against a server bound on an ephemeral port

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wicket::{AppState, Args};

const SECRET: &str = "http-test-secret-that-is-at-least-32-chars";

struct TestServer {
    addr: SocketAddr,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let args = Args::try_parse_from(["wicket", "--auth-secret-key", SECRET]).unwrap();
        let codec = args.token_codec().unwrap();
        let state = AppState::in_memory(args, codec);
        state
            .accounts
            .provision("root", Some("rootpw"), true)
            .await
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(wicket::serve(listener, Arc::new(state)));

        Self {
            addr,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let resp = self
            .client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.unwrap()
    }
}

async fn detail(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    body["detail"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn root_and_ping() {
    let server = TestServer::start().await;

    let body: Value = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "ecyc": "e" }));

    let body: Value = server
        .client
        .get(server.url("/ping"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["ecyc"], "e");
    assert!(body["time"].is_f64());
}

#[tokio::test]
async fn login_and_auth() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/login"))
        .form(&[("grant_type", "password"), ("username", "root"), ("password", "rootpw")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], "root");
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["is_admin"], true);

    let token = body["access_token"].as_str().unwrap();
    let resp = server.post_json("/auth", Some(token), json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "username": "root", "is_admin": true }));
}

#[tokio::test]
async fn failed_login_challenges() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(server.url("/login"))
        .form(&[("username", "root"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["www-authenticate"], "Bearer");
    assert_eq!(detail(resp).await, "로그인 실패");
}

#[tokio::test]
async fn guest_login_with_json() {
    let server = TestServer::start().await;

    let resp = server
        .post_json("/login", None, json!({ "username": "guest_abc" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["is_admin"], false);

    let token = body["access_token"].as_str().unwrap();
    let resp = server.post_json("/auth", Some(token), json!({})).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], "guest_abc");
}

#[tokio::test]
async fn auth_failures() {
    let server = TestServer::start().await;

    let resp = server.post_json("/auth", None, json!({})).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["www-authenticate"], "Bearer");
    assert_eq!(detail(resp).await, "로그인 필요");

    let resp = server.post_json("/auth", Some("not.a.jwt"), json!({})).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(detail(resp).await, "인증 실패, 재로그인 필요");
}

#[tokio::test]
async fn account_administration() {
    let server = TestServer::start().await;
    let root = server.login("root", "rootpw").await;

    let resp = server
        .post_json(
            "/create-account",
            Some(&root),
            json!({ "username": "alice", "password": "pw" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(detail(resp).await, "계정 생성 완료");

    let resp = server
        .post_json(
            "/create-account",
            Some(&root),
            json!({ "username": "alice", "password": "pw" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = server
        .post_json(
            "/create-account",
            Some(&root),
            json!({ "username": "guest_alice", "password": "pw" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .post_json(
            "/change-password",
            Some(&root),
            json!({ "username": "alice", "password": "pw2" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(detail(resp).await, "비밀번호 변경 완료");
    server.login("alice", "pw2").await;

    let resp = server
        .post_json("/delete-account", Some(&root), json!({ "username": "alice" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(detail(resp).await, "계정 삭제 완료");

    let resp = server
        .post_json("/delete-account", Some(&root), json!({ "username": "alice" }))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(resp).await, "업서요");
}

#[tokio::test]
async fn administration_requires_admin() {
    let server = TestServer::start().await;
    let root = server.login("root", "rootpw").await;
    server
        .post_json(
            "/create-account",
            Some(&root),
            json!({ "username": "alice", "password": "pw" }),
        )
        .await;
    let alice = server.login("alice", "pw").await;

    let resp = server
        .post_json(
            "/change-password",
            Some(&alice),
            json!({ "username": "alice", "password": "x" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(detail(resp).await, "권한 없음");

    let resp = server
        .post_json("/delete-account", None, json!({ "username": "alice" }))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["www-authenticate"], "Bearer");
}

#[tokio::test]
async fn test_posts() {
    let server = TestServer::start().await;
    let root = server.login("root", "rootpw").await;
    server
        .post_json(
            "/create-account",
            Some(&root),
            json!({ "username": "alice", "password": "pw" }),
        )
        .await;
    let alice = server.login("alice", "pw").await;

    let resp = server
        .post_json(
            "/test-posts/",
            Some(&alice),
            json!({ "title": "hello", "content": "world" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Value = resp.json().await.unwrap();
    assert_eq!(posts[0]["id"], 1);
    assert_eq!(posts[0]["op"], "alice");
    assert_eq!(posts[0]["color"], 0);

    let resp = server
        .client
        .get(server.url("/test-posts/1"))
        .send()
        .await
        .unwrap();
    let post: Value = resp.json().await.unwrap();
    assert_eq!(post["title"], "hello");

    let resp = server
        .client
        .get(server.url("/test-posts/99"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(resp).await, "업서요");

    let resp = server
        .client
        .delete(server.url("/test-posts/"))
        .json(&json!({ "id": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(detail(resp).await, "로그인 필요");

    let resp = server
        .client
        .delete(server.url("/test-posts/"))
        .bearer_auth(&alice)
        .json(&json!({ "id": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Value = resp.json().await.unwrap();
    assert_eq!(posts, json!([]));
}

#[tokio::test]
async fn cors_preflight() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/login"))
        .header("Origin", "http://localhost:4200")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "http://localhost:4200"
    );

    let resp = server
        .client
        .get(server.url("/"))
        .header("Origin", "https://elsewhere.example")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn oversized_body_rejected() {
    let server = TestServer::start().await;
    let title = "x".repeat(20 * 1024);

    let resp = server
        .post_json("/test-posts/", None, json!({ "title": title }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .get(server.url("/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
