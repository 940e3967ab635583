//! End-to-end proxying behavior against a captive mock upstream.

use std::net::SocketAddr;

use serde_json::{Value, json};

mod common;
use common::{MockResponse, start_capturing_backend, start_gateway, test_client};

#[tokio::test]
async fn test_json_body_passes_through_byte_for_byte() {
    let backend_addr: SocketAddr = "127.0.0.1:28381".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28382".parse().unwrap();

    let captured = start_capturing_backend(
        backend_addr,
        MockResponse::json(201, r#"{"uuid":"p-1"}"#),
    )
    .await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    // A float this wide loses precision if the body is re-serialized.
    let payload = br#"{"title":"Q","pages":123456789012345,"score":0.30000000000000004}"#;
    let res = test_client()
        .post(format!("http://{}/api/papers", proxy_addr))
        .header("content-type", "application/json")
        .body(payload.to_vec())
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 201);

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/api/v1/papers");
    assert_eq!(requests[0].body, payload.to_vec());

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_headers_filtered_but_authorization_forwarded() {
    let backend_addr: SocketAddr = "127.0.0.1:28383".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28384".parse().unwrap();

    let captured =
        start_capturing_backend(backend_addr, MockResponse::json(200, r#"{"content":[]}"#)).await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    let res = test_client()
        .get(format!(
            "http://{}/api/papers?page=0&size=10&sortBy=createdAt&direction=desc",
            proxy_addr
        ))
        .header("authorization", "Bearer abc")
        .header("x-debug", "1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let upstream = &requests[0];
    assert_eq!(
        upstream.target,
        "/api/v1/papers?page=0&size=10&sortBy=createdAt&direction=desc"
    );
    assert_eq!(upstream.header("authorization"), Some("Bearer abc"));
    assert_eq!(upstream.header("x-debug"), None);
    assert_eq!(upstream.header("x-request-id"), None);

    shutdown.trigger();
}

#[tokio::test]
async fn test_access_token_cookie_becomes_bearer() {
    let backend_addr: SocketAddr = "127.0.0.1:28385".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28386".parse().unwrap();

    let captured =
        start_capturing_backend(backend_addr, MockResponse::json(200, r#"{"content":[]}"#)).await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    let res = test_client()
        .get(format!("http://{}/api/categories", proxy_addr))
        .header("cookie", "theme=dark; access_token=tok123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let requests = captured.lock().unwrap();
    assert_eq!(requests[0].header("authorization"), Some("Bearer tok123"));
    assert_eq!(requests[0].header("cookie"), None);

    shutdown.trigger();
}

#[tokio::test]
async fn test_options_preflight_answered_locally() {
    // No backend at all: preflight must not depend on upstream state.
    let proxy_addr: SocketAddr = "127.0.0.1:28387".parse().unwrap();
    let shutdown = start_gateway(proxy_addr, "http://127.0.0.1:1", |_| {}).await;

    for path in ["/api/papers", "/api/auth/login", "/api/media/file.pdf"] {
        let res = test_client()
            .request(
                reqwest::Method::OPTIONS,
                format!("http://{}{}", proxy_addr, path),
            )
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "preflight failed for {}", path);
        let headers = res.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Content-Type, Authorization"
        );
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_status_and_error_preserved() {
    let backend_addr: SocketAddr = "127.0.0.1:28388".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28389".parse().unwrap();

    start_capturing_backend(
        backend_addr,
        MockResponse::json(403, r#"{"message":"forbidden"}"#),
    )
    .await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    let res = test_client()
        .put(format!("http://{}/api/papers/author/a-b-c", proxy_addr))
        .header("content-type", "application/json")
        .body(r#"{"title":"new"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], json!("Failed to update paper"));
    assert_eq!(body["error"], json!("forbidden"));
    assert_eq!(body["status"], json!(403));

    shutdown.trigger();
}

#[tokio::test]
async fn test_register_missing_email_rejected_before_upstream() {
    let backend_addr: SocketAddr = "127.0.0.1:28390".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28391".parse().unwrap();

    let captured =
        start_capturing_backend(backend_addr, MockResponse::json(200, "{}")).await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    let res = test_client()
        .post(format!("http://{}/api/auth/register", proxy_addr))
        .json(&json!({"password": "pw", "firstName": "A", "lastName": "B"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"], json!(["email"]));

    // No upstream round-trip happened.
    assert!(captured.lock().unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_multipart_upload_bytes_unchanged() {
    let backend_addr: SocketAddr = "127.0.0.1:28392".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28393".parse().unwrap();

    let captured = start_capturing_backend(
        backend_addr,
        MockResponse::json(201, r#"{"uuid":"p-2"}"#),
    )
    .await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    // Binary payload with NUL bytes, framed as multipart by hand so the
    // exact bytes on the wire are known.
    let boundary = "gwtestboundary";
    let file_bytes: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"paper.pdf\"\r\nContent-Type: application/pdf\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&file_bytes);
    body.extend_from_slice(format!("\r\n--{b}--\r\n", b = boundary).as_bytes());

    let content_type = format!("multipart/form-data; boundary={}", boundary);
    let res = test_client()
        .post(format!("http://{}/api/papers", proxy_addr))
        .header("content-type", &content_type)
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("content-type"), Some(content_type.as_str()));
    assert_eq!(requests[0].body.len(), body.len());
    assert_eq!(requests[0].body, body);

    shutdown.trigger();
}

#[tokio::test]
async fn test_list_response_relayed_unmodified() {
    let backend_addr: SocketAddr = "127.0.0.1:28394".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28395".parse().unwrap();

    let upstream_body =
        r#"{"papers":{"content":[{"uuid":"p-1","title":"Q"}],"totalElements":42}}"#;
    start_capturing_backend(backend_addr, MockResponse::json(200, upstream_body)).await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    let res = test_client()
        .get(format!("http://{}/api/papers?page=0&size=10", proxy_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let expected: Value = serde_json::from_str(upstream_body).unwrap();
    assert_eq!(body, expected);

    shutdown.trigger();
}

#[tokio::test]
async fn test_misspelled_thumbnail_key_renamed() {
    let backend_addr: SocketAddr = "127.0.0.1:28396".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28397".parse().unwrap();

    start_capturing_backend(
        backend_addr,
        MockResponse::json(
            200,
            r#"{"papers":{"content":[{"uuid":"p-1","thumbnailUr":"/media/t.png"}],"totalElements":1}}"#,
        ),
    )
    .await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    let res = test_client()
        .get(format!("http://{}/api/papers", proxy_addr))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let paper = &body["papers"]["content"][0];
    assert_eq!(paper["thumbnailUrl"], json!("/media/t.png"));
    assert!(paper.get("thumbnailUr").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_method_not_in_allowlist_rejected() {
    let backend_addr: SocketAddr = "127.0.0.1:28398".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28399".parse().unwrap();

    let captured = start_capturing_backend(backend_addr, MockResponse::json(200, "{}")).await;
    let shutdown = start_gateway(proxy_addr, &format!("http://{}", backend_addr), |_| {}).await;

    let res = test_client()
        .post(format!("http://{}/api/media/file.pdf", proxy_addr))
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(
        res.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert!(captured.lock().unwrap().is_empty());

    shutdown.trigger();
}
