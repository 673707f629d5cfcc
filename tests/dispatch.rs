//! Named-method dispatch tests: argument mappings in, JSON or error payloads out.

mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{three_page_doc, write_doc, Counters, ScriptedEngine};
use pdf2bitmap::{dispatch, ErrorKind, Pdf2BitmapService, ServiceConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn service(dir: &TempDir) -> (Pdf2BitmapService, Arc<Counters>) {
    let engine = ScriptedEngine::new();
    let counters = Arc::clone(&engine.counters);
    let config = ServiceConfig::builder()
        .cache_dir(dir.path().join("cache"))
        .build()
        .unwrap();
    (Pdf2BitmapService::new(Arc::new(engine), config), counters)
}

#[tokio::test]
async fn convert_page_returns_result_mapping() {
    let dir = TempDir::new().unwrap();
    let (svc, counters) = service(&dir);
    let doc = three_page_doc(dir.path());

    let value = dispatch(
        &svc,
        "convertPage",
        json!({ "filePath": doc, "pageIndex": 1, "scaleFactor": 1.0 }),
    )
    .await
    .unwrap();

    assert_eq!(value["width"], 595);
    assert_eq!(value["height"], 842);
    assert_eq!(value["pageCount"], 3);
    assert_eq!(value["pageIndex"], 1);
    assert_eq!(value["dpi"], 300);
    let out = value["outputPath"].as_str().unwrap();
    assert!(std::path::Path::new(out).is_file());
    counters.assert_released();
}

#[tokio::test]
async fn legacy_method_and_argument_names_work() {
    let dir = TempDir::new().unwrap();
    let (svc, _) = service(&dir);
    let doc = three_page_doc(dir.path());
    let out = dir.path().join("legacy.png");

    let value = dispatch(
        &svc,
        "convertPdfToBitmap",
        json!({ "filePath": doc, "pageNumber": 2, "scaleFactor": 0.5, "savePath": out }),
    )
    .await
    .unwrap();
    assert_eq!(value["outputPath"], json!(out));
    assert_eq!(value["width"], 396);

    let count = dispatch(&svc, "getPdfPageCount", json!({ "filePath": doc }))
        .await
        .unwrap();
    assert_eq!(count, json!(3));
}

#[tokio::test]
async fn convert_page_without_arguments_is_invalid_argument() {
    let dir = TempDir::new().unwrap();
    let (svc, _) = service(&dir);

    for args in [json!({}), Value::Null, json!({ "filePath": null })] {
        let err = dispatch(&svc, "convertPage", args).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
    let err = dispatch(&svc, "getPageCount", json!({})).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    let err = dispatch(&svc, "testAccess", json!({})).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn out_of_range_payload_carries_context() {
    let dir = TempDir::new().unwrap();
    let (svc, counters) = service(&dir);
    let doc = three_page_doc(dir.path());

    let err = dispatch(&svc, "convertPage", json!({ "filePath": doc, "pageIndex": 7 }))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PageIndexOutOfRange);
    assert_eq!(err.details.as_deref(), Some("requestedIndex=7, pageCount=3"));
    counters.assert_released();
}

#[tokio::test]
async fn render_failure_payload() {
    let dir = TempDir::new().unwrap();
    let (svc, counters) = service(&dir);
    let doc = write_doc(dir.path(), "bad.pdf", &["page 100 100 fail"]);

    let err = dispatch(&svc, "convertPage", json!({ "filePath": doc }))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RenderFailure);
    assert!(err.message.contains("scripted failure"), "{err}");
    counters.assert_released();
}

#[tokio::test]
async fn plain_surface_is_inline_png() {
    let dir = TempDir::new().unwrap();
    let (svc, _) = service(&dir);

    let value = dispatch(&svc, "renderSimpleBitmap", Value::Null).await.unwrap();
    assert_eq!(value["width"], 300);
    assert_eq!(value["height"], 300);

    let png = STANDARD
        .decode(value["base64Image"].as_str().unwrap())
        .unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (300, 300));
    assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));

    let value = dispatch(&svc, "renderPlainSurface", json!({ "width": 40, "height": 10 }))
        .await
        .unwrap();
    assert_eq!((value["width"].as_u64(), value["height"].as_u64()), (Some(40), Some(10)));
}

#[tokio::test]
async fn test_access_never_fails_for_bad_files() {
    let dir = TempDir::new().unwrap();
    let (svc, _) = service(&dir);

    let value = dispatch(
        &svc,
        "testPdfAccess",
        json!({ "filePath": dir.path().join("missing.pdf") }),
    )
    .await
    .unwrap();
    assert_eq!(value, json!({ "fileExists": false }));

    let doc = three_page_doc(dir.path());
    let value = dispatch(&svc, "testAccess", json!({ "filePath": doc }))
        .await
        .unwrap();
    assert_eq!(value["canOpenRenderer"], true);
    assert_eq!(value["pageCount"], 3);
}

#[tokio::test]
async fn unknown_method_is_not_implemented() {
    let dir = TempDir::new().unwrap();
    let (svc, _) = service(&dir);

    let err = dispatch(&svc, "rotatePage", json!({})).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotImplemented);
    assert!(err.message.contains("rotatePage"));

    let version = dispatch(&svc, "getPlatformVersion", Value::Null).await.unwrap();
    assert!(version.as_str().unwrap().contains(std::env::consts::ARCH));
}

#[tokio::test]
async fn concurrent_dispatches_share_one_service() {
    let dir = TempDir::new().unwrap();
    let (svc, counters) = service(&dir);
    let doc = three_page_doc(dir.path());

    let mut tasks = Vec::new();
    for i in 0..6 {
        let svc = svc.clone();
        let doc = doc.clone();
        tasks.push(tokio::spawn(async move {
            dispatch(&svc, "convertPage", json!({ "filePath": doc, "pageIndex": i % 3 })).await
        }));
    }
    for task in tasks {
        let value = task.await.unwrap().unwrap();
        assert_eq!(value["pageCount"], 3);
    }
    counters.assert_released();
    svc.shutdown();
}
