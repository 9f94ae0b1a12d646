use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use bytes::Bytes;
use courier_blob::{BlobAdapter, BlobConfig, MemoryBlobStore, StoredObject};
use courier_core::CourierApp;
use courier_webhook::build_with;
use courier_webhook::services::{IngestService, MediaFetcher};
use http_body_util::BodyExt;
use lopdf::{dictionary, Document, Object, Stream};
use tower::ServiceExt;

const FAILURE_XML: &str = "<Response><Message>Oops! Something went wrong</Message></Response>";
const SENDER: &str = "whatsapp:+15551234567";

/// Serves one canned response and records every requested URL.
struct StubFetcher {
    response: Result<Bytes, String>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn ok(body: impl Into<Bytes>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(body.into()),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Bytes> {
        self.requested.lock().unwrap().push(url.to_string());
        self.response.clone().map_err(anyhow::Error::msg)
    }
}

struct Harness {
    router: axum::Router,
    store: MemoryBlobStore,
    fetcher: Arc<StubFetcher>,
}

fn harness(fetcher: Arc<StubFetcher>) -> Harness {
    let store = MemoryBlobStore::new();
    let blobs = BlobAdapter::new(store.clone(), BlobConfig::default());
    let service = IngestService::new(fetcher.clone(), blobs);
    let ax = build_with(CourierApp::new(), service);

    Harness {
        router: ax.router,
        store,
        fetcher,
    }
}

fn webhook_request(fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/whatsapp-webhook")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

fn media_fields<'a>(content_type: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("From", SENDER),
        ("Body", ""),
        ("NumMedia", "1"),
        ("MediaUrl0", "https://api.twilio.example/Media/ME123"),
        ("MediaContentType0", content_type),
    ]
}

async fn text_body(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The only object in the store, with its key.
fn single_object(store: &MemoryBlobStore) -> (String, StoredObject) {
    let keys = store.keys();
    assert_eq!(keys.len(), 1, "expected exactly one stored object, got {keys:?}");
    let object = store.get(&keys[0]).unwrap();
    (keys[0].clone(), object)
}

fn two_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for width in [200i64, 300] {
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Integer(width), 400.into()],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 2,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn media_box_width(doc: &Document, page: lopdf::ObjectId) -> i64 {
    doc.get_dictionary(page)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()[2]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn health_ok() {
    let h = harness(StubFetcher::ok(Bytes::new()));

    let res = h
        .router
        .oneshot(Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(text_body(res).await, "ok");
}

#[tokio::test]
async fn text_message_is_stored_as_plain_text() {
    let h = harness(StubFetcher::ok(Bytes::new()));

    let res = h
        .router
        .oneshot(webhook_request(&[
            ("From", SENDER),
            ("Body", "hello & welcome"),
            ("NumMedia", "0"),
        ]))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/xml; charset=utf-8"
    );
    assert!(res.headers().get("x-request-id").is_some());
    assert_eq!(
        text_body(res).await,
        "<Response><Message>Got your text and saved it!</Message></Response>"
    );

    let (key, object) = single_object(&h.store);
    assert!(key.starts_with("whatsapp-text/"), "{key}");
    assert!(key.ends_with("-+15551234567.txt"), "{key}");
    assert_eq!(object.body.as_ref(), b"hello & welcome");
    assert_eq!(object.content_type.as_deref(), Some("text/plain"));
    assert!(h.fetcher.requested().is_empty());
}

#[tokio::test]
async fn missing_num_media_counts_as_text() {
    let h = harness(StubFetcher::ok(Bytes::new()));

    let res = h
        .router
        .oneshot(webhook_request(&[("From", SENDER), ("Body", "hi")]))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let (key, _) = single_object(&h.store);
    assert!(key.starts_with("whatsapp-text/"));
}

#[tokio::test]
async fn valid_pdf_is_repaired_with_all_pages() {
    let h = harness(StubFetcher::ok(two_page_pdf()));

    let res = h
        .router
        .oneshot(webhook_request(&media_fields("application/pdf")))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let (key, object) = single_object(&h.store);
    assert!(key.starts_with("whatsapp-media/"), "{key}");
    assert!(key.ends_with("-+15551234567.pdf"), "{key}");
    assert_eq!(
        text_body(res).await,
        format!("<Response><Message>Got your file! Uploaded as {key}</Message></Response>")
    );
    assert_eq!(object.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(
        h.fetcher.requested(),
        vec!["https://api.twilio.example/Media/ME123".to_string()]
    );

    assert!(object.body.starts_with(b"%PDF"));
    let doc = Document::load_mem(&object.body).unwrap();
    let widths: Vec<i64> = doc
        .get_pages()
        .into_values()
        .map(|page| media_box_width(&doc, page))
        .collect();
    assert_eq!(widths, vec![200, 300]);
}

#[tokio::test]
async fn bytes_declared_pdf_are_wrapped_into_a_placeholder() {
    let h = harness(StubFetcher::ok(Bytes::from_static(b"<html>not a pdf</html>")));

    let res = h
        .router
        .oneshot(webhook_request(&media_fields("application/pdf")))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let (key, object) = single_object(&h.store);
    assert!(key.ends_with(".pdf"));
    assert_eq!(object.content_type.as_deref(), Some("application/pdf"));

    let doc = Document::load_mem(&object.body).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page = *pages.values().next().unwrap();
    assert_eq!(media_box_width(&doc, page), 600);
}

#[tokio::test]
async fn fetch_failure_returns_500_and_stores_nothing() {
    let h = harness(StubFetcher::failing("404 Not Found"));

    let res = h
        .router
        .oneshot(webhook_request(&media_fields("application/pdf")))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/xml; charset=utf-8"
    );
    assert_eq!(text_body(res).await, FAILURE_XML);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn jpeg_is_stored_unchanged() {
    // Not a decodable JPEG; it must pass through untouched all the same.
    let payload: &'static [u8] = b"\xff\xd8\xff\xe0 fake jpeg payload";
    let h = harness(StubFetcher::ok(Bytes::from_static(payload)));

    let res = h
        .router
        .oneshot(webhook_request(&media_fields("image/jpeg")))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let (key, object) = single_object(&h.store);
    assert!(key.starts_with("whatsapp-media/"));
    assert!(key.ends_with("-+15551234567.jpeg"), "{key}");
    assert_eq!(object.body.as_ref(), payload);
    assert_eq!(object.content_type.as_deref(), Some("image/jpeg"));
}

#[tokio::test]
async fn missing_sender_is_rejected() {
    let h = harness(StubFetcher::ok(Bytes::new()));

    let res = h
        .router
        .oneshot(webhook_request(&[("Body", "hi"), ("NumMedia", "0")]))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    assert_eq!(text_body(res).await, FAILURE_XML);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn media_without_url_is_rejected_before_fetching() {
    let h = harness(StubFetcher::ok(Bytes::new()));

    let res = h
        .router
        .oneshot(webhook_request(&[
            ("From", SENDER),
            ("NumMedia", "1"),
            ("MediaContentType0", "image/png"),
        ]))
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    assert!(h.fetcher.requested().is_empty());
    assert!(h.store.is_empty());
}
