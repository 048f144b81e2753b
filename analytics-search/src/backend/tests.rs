use super::*;
use crate::config::AnalyticsConfig;
use mockito::{Matcher, Server};
use serde_json::json;

fn backend_for(server: &Server) -> HttpSearchBackend {
    let config = AnalyticsConfig {
        backend_url: format!("{}/", server.url()),
        ..Default::default()
    };
    HttpSearchBackend::new(&config).unwrap()
}

#[tokio::test]
async fn test_query_sends_body_and_params() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/logs-2024-01/_search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("scroll".into(), "10m".into()),
            Matcher::UrlEncoded("allow_no_indices".into(), "true".into()),
        ]))
        .match_body(Matcher::Json(json!({"size": 10})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"hits": {"total": 1, "hits": [{"_id": "a"}]}}"#)
        .create_async()
        .await;

    let backend = backend_for(&server);
    let request = BackendRequest::new(Method::Post)
        .with_query_params(&[
            ("scroll".to_string(), "10m".to_string()),
            ("allow_no_indices".to_string(), "true".to_string()),
        ])
        .with_body(json!({"size": 10}));

    let response = backend.query("/logs-2024-01/_search", request).await.unwrap();
    assert_eq!(response["hits"]["hits"][0]["_id"], json!("a"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_query_delete_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/_search/scroll")
        .match_body(Matcher::Json(json!({"scroll_id": ["abc"]})))
        .with_status(200)
        .with_body(r#"{"succeeded": true}"#)
        .create_async()
        .await;

    let backend = backend_for(&server);
    let request =
        BackendRequest::new(Method::Delete).with_body(json!({"scroll_id": ["abc"]}));
    let response = backend.query("/_search/scroll", request).await.unwrap();
    assert_eq!(response["succeeded"], json!(true));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_query_error_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/logs/_search")
        .with_status(400)
        .with_body(r#"{"error": "parsing_exception"}"#)
        .create_async()
        .await;

    let backend = backend_for(&server);
    let err = backend
        .query("/logs/_search", BackendRequest::new(Method::Post))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("parsing_exception"));
}

#[tokio::test]
async fn test_query_invalid_json_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/_search/scroll")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let backend = backend_for(&server);
    let err = backend
        .query("/_search/scroll", BackendRequest::new(Method::Get))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to parse search response"));
}

#[test]
fn test_debug_hides_client() {
    let config = AnalyticsConfig {
        backend_url: "http://search.internal:9200/".to_string(),
        ..Default::default()
    };
    let backend = HttpSearchBackend::new(&config).unwrap();
    assert_eq!(
        format!("{:?}", backend),
        "HttpSearchBackend { base_url: \"http://search.internal:9200\" }"
    );
    assert_eq!(backend.name(), "http");
}
