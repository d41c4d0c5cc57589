use std::collections::VecDeque;
use std::sync::Arc;

use http::{Response as HttpResponse, StatusCode};
use lookout::client::{HttpTransport, TransportOptions};
use lookout::host::ModerationTransport;
use lookout::http_client::HttpClient;
use lookout::{ItemId, RequestError};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct MockClient {
    queue: Arc<Mutex<VecDeque<http::Response<Vec<u8>>>>>,
    log: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
}

impl MockClient {
    async fn push(&self, resp: http::Response<Vec<u8>>) {
        self.queue.lock().await.push_back(resp);
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl core::future::Future<
        Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>,
    > + Send {
        let log = self.log.clone();
        let queue = self.queue.clone();
        async move {
            log.lock().await.push(request);
            Ok(queue.lock().await.pop_front().expect("no queued response"))
        }
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> http::Response<Vec<u8>> {
    HttpResponse::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .unwrap()
}

fn transport(client: &MockClient) -> HttpTransport<MockClient> {
    HttpTransport::new(
        client.clone(),
        TransportOptions::new()
            .endpoint("http://moderation.test:3030".parse().unwrap())
            .build(),
    )
}

#[tokio::test]
async fn posts_query_and_decodes_server_post() {
    let client = MockClient::default();
    client
        .push(json_response(
            StatusCode::OK,
            serde_json::json!({
                "id": "abc123",
                "title": "a gallery post",
                "post_url": "https://imgur.com/gallery/abc123",
                "datetime": "1700000000000",
                "unrecoverable": null,
                "images": [
                    { "id": "img1", "unrecoverable": true, "text": "ocr text" },
                    { "id": "img2", "unrecoverable": null },
                    { "id": "img3" }
                ]
            }),
        ))
        .await;

    let result = transport(&client)
        .check_item(&ItemId::new("abc123").unwrap())
        .await
        .unwrap();

    assert!(!result.unrecoverable);
    assert_eq!(result.images.len(), 3);
    let flagged: Vec<_> = result
        .unrecoverable_images()
        .map(|image| image.id.as_str())
        .collect();
    assert_eq!(flagged, vec!["img1"]);

    let log = client.log.lock().await;
    assert_eq!(log.len(), 1);
    let request = &log[0];
    assert_eq!(request.method(), http::Method::POST);
    assert_eq!(
        request.uri().to_string(),
        "http://moderation.test:3030/check_post_priority"
    );
    let body: serde_json::Value = serde_json::from_slice(request.body()).unwrap();
    assert_eq!(body["id"], "abc123");
    assert_eq!(body["post_url"], "https://imgur.com/gallery/abc123");
    assert!(body["datetime"].as_str().unwrap().parse::<i64>().is_ok());
}

#[tokio::test]
async fn whole_post_flag_is_read() {
    let client = MockClient::default();
    client
        .push(json_response(
            StatusCode::OK,
            serde_json::json!({ "id": "abc123", "unrecoverable": true, "images": [] }),
        ))
        .await;

    let result = transport(&client)
        .check_item(&ItemId::new("abc123").unwrap())
        .await
        .unwrap();
    assert!(result.unrecoverable);
}

#[tokio::test]
async fn server_error_becomes_http_error() {
    let client = MockClient::default();
    client
        .push(
            HttpResponse::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(b"Database Error(4)".to_vec())
                .unwrap(),
        )
        .await;

    let err = transport(&client)
        .check_item(&ItemId::new("abc123").unwrap())
        .await
        .unwrap_err();

    match &err {
        RequestError::Http(http) => assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR),
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert!(err.to_string().contains("Database Error(4)"));
}

#[tokio::test]
async fn gallery_base_is_configurable() {
    let client = MockClient::default();
    client
        .push(json_response(StatusCode::OK, serde_json::json!({ "images": [] })))
        .await;

    let transport = HttpTransport::new(
        client.clone(),
        TransportOptions::new()
            .endpoint("http://moderation.test/".parse().unwrap())
            .gallery_base("https://mirror.example/g/".parse().unwrap())
            .build(),
    );
    transport
        .check_item(&ItemId::from_link("https://imgur.com/gallery/xyz?x=1").unwrap())
        .await
        .unwrap();

    let log = client.log.lock().await;
    let body: serde_json::Value = serde_json::from_slice(log[0].body()).unwrap();
    assert_eq!(body["id"], "xyz");
    assert_eq!(body["post_url"], "https://mirror.example/g/xyz");
}
