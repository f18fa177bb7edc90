//! Document upload, default flag, file replacement and delivery.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_upload_stores_blob_and_metadata() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, user_id) = signup(&app, "upload@example.com").await;

    let body = upload_document(&app, &token, "cv", "Engineering CV", false).await;
    let doc = &body["data"];

    assert_eq!(doc["type"], "cv");
    assert_eq!(doc["title"], "Engineering CV");
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["isArchived"], false);
    assert_eq!(doc["file"]["fileName"], "resume.pdf");
    assert_eq!(doc["file"]["mimeType"], "application/pdf");

    let key = doc["file"]["fileId"].as_str().unwrap();
    assert!(key.starts_with(&format!("documents/{}/", user_id)));
    assert!(ctx.store.contains(key));
}

#[actix_rt::test]
async fn test_upload_title_falls_back_to_file_name() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "notitle@example.com").await;

    let (content_type, payload) = multipart_body(
        &[("type", "portfolio")],
        Some(("work.pdf", "application/pdf", b"%PDF")),
    );
    let req = test::TestRequest::post()
        .uri("/api/documents")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["data"]["title"], "work.pdf");
}

#[actix_rt::test]
async fn test_upload_rejects_invalid_forms() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "invalid@example.com").await;

    let cases = [
        // Unknown type
        multipart_body(
            &[("type", "resume"), ("title", "x")],
            Some(("cv.pdf", "application/pdf", b"data")),
        ),
        // Missing file
        multipart_body(&[("type", "cv"), ("title", "x")], None),
        // Disallowed extension
        multipart_body(
            &[("type", "cv"), ("title", "x")],
            Some(("run.exe", "application/octet-stream", b"MZ")),
        ),
    ];

    for (content_type, payload) in cases {
        let req = test::TestRequest::post()
            .uri("/api/documents")
            .insert_header(bearer(&token))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, 400, "{}", body);
    }

    assert!(ctx.store.is_empty());
}

#[actix_rt::test]
async fn test_upload_rejects_oversized_file() {
    let mut ctx = create_test_context().await;
    ctx.config.max_upload_size = 16;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "big@example.com").await;

    let data = vec![b'a'; 64];
    let (content_type, payload) = multipart_body(
        &[("type", "cv"), ("title", "Big")],
        Some(("big.txt", "text/plain", &data)),
    );
    let req = test::TestRequest::post()
        .uri("/api/documents")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let (status, _) = send(&app, req).await;

    assert_eq!(status, 400);
    assert!(ctx.store.is_empty());
}

#[actix_rt::test]
async fn test_sequential_defaults_leave_exactly_one() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "default@example.com").await;

    let first = upload_document(&app, &token, "cv", "First", true).await;
    let second = upload_document(&app, &token, "cv", "Second", true).await;
    // Other types are unaffected
    upload_document(&app, &token, "cover_letter", "Letter", true).await;

    let req = test::TestRequest::get()
        .uri("/api/documents?type=cv")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    let defaults: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["isDefault"] == true)
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, vec![second["data"]["id"].as_str().unwrap()]);

    // Promoting the first one through an update flips it back
    let first_id = first["data"]["id"].as_str().unwrap();
    let req = test::TestRequest::put()
        .uri(&format!("/api/documents/{}", first_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "isDefault": true }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);

    let req = test::TestRequest::get()
        .uri("/api/documents?type=cv")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    let defaults: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["isDefault"] == true)
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, vec![first_id]);

    let req = test::TestRequest::get()
        .uri("/api/documents?type=cover_letter")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"][0]["isDefault"], true);
}

#[actix_rt::test]
async fn test_list_is_newest_first_and_hides_archived() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "listing@example.com").await;

    let older = upload_document(&app, &token, "cv", "Older", false).await;
    let newer = upload_document(&app, &token, "cv", "Newer", false).await;

    let req = test::TestRequest::get()
        .uri("/api/documents")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"][0]["id"], newer["data"]["id"]);
    assert_eq!(body["data"][1]["id"], older["data"]["id"]);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/documents/{}", newer["data"]["id"].as_str().unwrap()))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);

    let req = test::TestRequest::get()
        .uri("/api/documents")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    let docs = body["data"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["id"], older["data"]["id"]);
    assert_eq!(ctx.store.len(), 1);
}

#[actix_rt::test]
async fn test_replace_file_bumps_version_and_drops_old_blob() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "replacefile@example.com").await;

    let doc = upload_document(&app, &token, "cv", "CV", false).await;
    let id = doc["data"]["id"].as_str().unwrap();
    let old_key = doc["data"]["file"]["fileId"].as_str().unwrap().to_string();

    let (content_type, payload) =
        multipart_body(&[], Some(("cv-v2.txt", "text/plain", b"second version")));
    let req = test::TestRequest::post()
        .uri(&format!("/api/documents/{}/file", id))
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["data"]["version"], 2);
    assert_eq!(body["data"]["file"]["fileName"], "cv-v2.txt");
    assert!(!ctx.store.contains(&old_key));
    assert!(
        ctx.store
            .contains(body["data"]["file"]["fileId"].as_str().unwrap())
    );
}

#[actix_rt::test]
async fn test_download_and_view_set_disposition() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "download@example.com").await;

    let doc = upload_document(&app, &token, "cv", "CV", false).await;
    let id = doc["data"]["id"].as_str().unwrap();

    for (action, disposition) in [("download", "attachment"), ("view", "inline")] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/documents/{}/{}", id, action))
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let headers = resp.headers();
        assert_eq!(headers.get("content-type").unwrap(), "application/pdf");
        let value = headers
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(value.starts_with(disposition), "{}", value);
        assert!(value.contains("resume.pdf"), "{}", value);

        let bytes = test::read_body(resp).await;
        assert_eq!(&bytes[..], b"%PDF-1.4 test document");
    }
}

#[actix_rt::test]
async fn test_documents_are_owner_scoped() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (owner, _) = signup(&app, "docowner@example.com").await;
    let (stranger, _) = signup(&app, "docstranger@example.com").await;

    let doc = upload_document(&app, &owner, "cv", "Private", false).await;
    let id = doc["data"]["id"].as_str().unwrap();

    for uri in [
        format!("/api/documents/{}", id),
        format!("/api/documents/{}/download", id),
    ] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&stranger))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    let req = test::TestRequest::get()
        .uri("/api/documents")
        .insert_header(bearer(&stranger))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_rt::test]
async fn test_archive_removes_job_references() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "archive-linked@example.com").await;

    let cv = upload_document(&app, &token, "cv", "CV", false).await;
    let cv_id = cv["data"]["id"].as_str().unwrap().to_string();
    let letter = upload_document(&app, &token, "cover_letter", "Letter", false).await;
    let letter_id = letter["data"]["id"].as_str().unwrap().to_string();

    let mut payload = job_payload("Engineer", "Acme");
    payload["documents"] = json!({ "cv": cv_id, "coverLetter": letter_id });
    let (_, body) = create_job(&app, &token, payload).await;
    let first_job = body["data"]["id"].as_str().unwrap().to_string();

    let mut payload = job_payload("Designer", "Globex");
    payload["documents"] = json!({ "other": [cv_id] });
    let (_, body) = create_job(&app, &token, payload).await;
    let second_job = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/documents/{}", cv_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/jobs/{}", first_job))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert!(body["data"]["documents"]["cv"].is_null());
    assert_eq!(body["data"]["documents"]["coverLetter"], letter_id.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("/api/jobs/{}", second_job))
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"]["documents"]["other"], json!([]));
}

#[actix_rt::test]
async fn test_archive_succeeds_when_blob_delete_fails() {
    let ctx = create_test_context().await;
    let store = FailingStorage::new(ctx.store.clone());
    let app = create_test_app_with_store(&ctx, std::sync::Arc::new(store.clone())).await;
    let (token, _) = signup(&app, "blob-down@example.com").await;

    let doc = upload_document(&app, &token, "cv", "CV", true).await;
    let doc_id = doc["data"]["id"].as_str().unwrap().to_string();
    let key = doc["data"]["file"]["fileId"].as_str().unwrap().to_string();

    store.fail_delete(true);
    let req = test::TestRequest::delete()
        .uri(&format!("/api/documents/{}", doc_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "{}", body);

    let req = test::TestRequest::get()
        .uri(&format!("/api/documents/{}", doc_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);

    // The blob is orphaned, not the metadata
    assert!(ctx.store.contains(&key));
}

#[actix_rt::test]
async fn test_upload_storage_failure_stores_no_metadata() {
    let ctx = create_test_context().await;
    let store = FailingStorage::new(ctx.store.clone());
    let app = create_test_app_with_store(&ctx, std::sync::Arc::new(store.clone())).await;
    let (token, _) = signup(&app, "put-down@example.com").await;

    store.fail_put(true);
    let (content_type, payload) = multipart_body(
        &[("type", "cv"), ("title", "CV")],
        Some(("resume.pdf", "application/pdf", b"%PDF-1.4")),
    );
    let req = test::TestRequest::post()
        .uri("/api/documents")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 500);
    assert_eq!(body["success"], false);

    let req = test::TestRequest::get()
        .uri("/api/documents")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));
    assert!(ctx.store.is_empty());
}

#[actix_rt::test]
async fn test_upload_rejects_truncated_extra_field() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "truncated@example.com").await;

    let (content_type, mut payload) = multipart_body(
        &[("type", "cv"), ("title", "CV")],
        Some(("resume.pdf", "application/pdf", b"%PDF-1.4")),
    );
    let boundary = content_type.rsplit("boundary=").next().unwrap().to_string();

    // Replace the closing boundary with an extra field that never ends
    let closing = format!("--{}--\r\n", boundary);
    payload.truncate(payload.len() - closing.len());
    payload.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\nunterminated",
            boundary
        )
        .as_bytes(),
    );

    let req = test::TestRequest::post()
        .uri("/api/documents")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400, "{}", body);
    assert!(ctx.store.is_empty());
}
