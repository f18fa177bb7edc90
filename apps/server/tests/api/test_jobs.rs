//! Job records, the status pipeline and document unlinking.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_job_defaults_to_wishlist() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, user_id) = signup(&app, "jobs@example.com").await;

    let (status, body) = create_job(&app, &token, job_payload("Backend Engineer", "Acme")).await;

    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["data"]["status"], "wishlist");
    assert_eq!(body["data"]["owner"], user_id.as_str());
    assert!(body["data"]["applicationDate"].is_string());
    assert_eq!(body["data"]["documents"]["other"], json!([]));
}

#[actix_rt::test]
async fn test_create_job_requires_fields() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "fields@example.com").await;

    let (status, body) = create_job(
        &app,
        &token,
        json!({ "title": "Engineer", "company": "  ", "country": "DE", "city": "Berlin" }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn test_duplicate_job_url_is_rejected_and_not_persisted() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "dupes@example.com").await;

    let mut payload = job_payload("Engineer", "Acme");
    payload["jobUrl"] = json!("https://jobs.example.com/42");
    let (status, _) = create_job(&app, &token, payload.clone()).await;
    assert_eq!(status, 201);

    // Surrounding whitespace is trimmed before the comparison
    payload["jobUrl"] = json!("  https://jobs.example.com/42  ");
    payload["title"] = json!("Another title");
    let (status, body) = create_job(&app, &token, payload).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "A job with this URL already exists");

    let req = test::TestRequest::get()
        .uri("/api/jobs")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_job_url_is_unique_per_owner_only() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (alice, _) = signup(&app, "alice@example.com").await;
    let (bob, _) = signup(&app, "bob@example.com").await;

    let mut payload = job_payload("Engineer", "Acme");
    payload["jobUrl"] = json!("https://jobs.example.com/shared");

    let (status, _) = create_job(&app, &alice, payload.clone()).await;
    assert_eq!(status, 201);
    let (status, _) = create_job(&app, &bob, payload).await;
    assert_eq!(status, 201);
}

#[actix_rt::test]
async fn test_list_jobs_filters_and_sorts_by_application_date() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "list@example.com").await;

    for (title, date, status) in [
        ("Old", "2026-01-05T10:00:00Z", "applied"),
        ("New", "2026-03-05T10:00:00Z", "applied"),
        ("Middle", "2026-02-05T10:00:00Z", "wishlist"),
    ] {
        let mut payload = job_payload(title, "Acme");
        payload["applicationDate"] = json!(date);
        payload["status"] = json!(status);
        let (code, _) = create_job(&app, &token, payload).await;
        assert_eq!(code, 201);
    }

    let req = test::TestRequest::get()
        .uri("/api/jobs")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["New", "Middle", "Old"]);

    let req = test::TestRequest::get()
        .uri("/api/jobs?status=applied")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/jobs?status=ghosted")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn test_status_transitions_are_unconstrained() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "status@example.com").await;

    let (_, body) = create_job(&app, &token, job_payload("Engineer", "Acme")).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    for status in ["accepted", "wishlist", "interview"] {
        let req = test::TestRequest::patch()
            .uri(&format!("/api/jobs/{}/status", job_id))
            .insert_header(bearer(&token))
            .set_json(json!({ "status": status }))
            .to_request();
        let (code, body) = send(&app, req).await;
        assert_eq!(code, 200);
        assert_eq!(body["data"]["status"], status);
    }
}

#[actix_rt::test]
async fn test_other_users_job_is_not_found() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (owner, _) = signup(&app, "owner@example.com").await;
    let (stranger, _) = signup(&app, "stranger@example.com").await;

    let (_, body) = create_job(&app, &owner, job_payload("Engineer", "Acme")).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/jobs/{}", job_id))
        .insert_header(bearer(&stranger))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/jobs/{}", job_id))
        .insert_header(bearer(&stranger))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_use_default_documents_fills_empty_slots() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "defaults@example.com").await;

    let cv = upload_document(&app, &token, "cv", "Default CV", true).await;
    let letter = upload_document(&app, &token, "cover_letter", "Letter", true).await;

    let mut payload = job_payload("Engineer", "Acme");
    payload["useDefaultDocuments"] = json!(true);
    let (status, body) = create_job(&app, &token, payload).await;

    assert_eq!(status, 201);
    assert_eq!(body["data"]["documents"]["cv"], cv["data"]["id"]);
    assert_eq!(body["data"]["documents"]["coverLetter"], letter["data"]["id"]);
    assert!(body["data"]["documents"]["portfolio"].is_null());

    let req = test::TestRequest::get()
        .uri(&format!("/api/documents/{}", cv["data"]["id"].as_str().unwrap()))
        .insert_header(bearer(&token))
        .to_request();
    let (_, doc) = send(&app, req).await;
    assert!(doc["data"]["lastUsedAt"].is_string());
}

#[actix_rt::test]
async fn test_update_with_remove_document_only_clears_that_reference() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "remove@example.com").await;

    let cv = upload_document(&app, &token, "cv", "CV", false).await;
    let cv_id = cv["data"]["id"].as_str().unwrap().to_string();

    let mut payload = job_payload("Engineer", "Acme");
    payload["notes"] = json!("keep me");
    payload["documents"] = json!({ "cv": cv_id });
    let (_, body) = create_job(&app, &token, payload).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/jobs/{}", job_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "removeDocument": { "docType": "cv", "docId": cv_id } }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 200, "{}", body);
    assert!(body["data"]["documents"]["cv"].is_null());
    assert_eq!(body["data"]["notes"], "keep me");
    assert_eq!(body["data"]["title"], "Engineer");
}

#[actix_rt::test]
async fn test_update_replaces_fields() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "replace@example.com").await;

    let mut payload = job_payload("Engineer", "Acme");
    payload["notes"] = json!("first notes");
    let (_, body) = create_job(&app, &token, payload).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/jobs/{}", job_id))
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "Senior Engineer",
            "company": "Acme",
            "country": "Germany",
            "city": "Hamburg",
            "status": "applied",
        }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["title"], "Senior Engineer");
    assert_eq!(body["data"]["city"], "Hamburg");
    assert_eq!(body["data"]["status"], "applied");
    assert!(body["data"]["notes"].is_null());
}

#[actix_rt::test]
async fn test_delete_job_keeps_referenced_documents() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "keepdocs@example.com").await;

    let cv = upload_document(&app, &token, "cv", "CV", false).await;
    let cv_id = cv["data"]["id"].as_str().unwrap().to_string();

    let mut payload = job_payload("Engineer", "Acme");
    payload["documents"] = json!({ "cv": cv_id });
    let (_, body) = create_job(&app, &token, payload).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/jobs/{}", job_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/documents/{}", cv_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["isArchived"], false);
    assert_eq!(ctx.store.len(), 1);
}

#[actix_rt::test]
async fn test_unlink_without_delete_keeps_document() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "unlink@example.com").await;

    let cv = upload_document(&app, &token, "cv", "CV", false).await;
    let cv_id = cv["data"]["id"].as_str().unwrap().to_string();

    let mut payload = job_payload("Engineer", "Acme");
    payload["documents"] = json!({ "cv": cv_id });
    let (_, body) = create_job(&app, &token, payload).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/jobs/{}/documents/{}?docType=cv", job_id, cv_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "{}", body);
    assert!(body["data"]["job"]["documents"]["cv"].is_null());
    assert_eq!(body["data"]["documentArchived"], false);

    let req = test::TestRequest::get()
        .uri(&format!("/api/documents/{}", cv_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);
}

#[actix_rt::test]
async fn test_unlink_with_delete_archives_and_is_retryable() {
    let ctx = create_test_context().await;
    let app = create_test_app(&ctx).await;
    let (token, _) = signup(&app, "archive@example.com").await;

    let cert = upload_document(&app, &token, "certificate", "Cert", false).await;
    let cert_id = cert["data"]["id"].as_str().unwrap().to_string();

    let mut payload = job_payload("Engineer", "Acme");
    payload["documents"] = json!({ "other": [cert_id] });
    let (_, body) = create_job(&app, &token, payload).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!(
        "/api/jobs/{}/documents/{}?deletePermanently=true",
        job_id, cert_id
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["data"]["job"]["documents"]["other"], json!([]));
    assert_eq!(body["data"]["documentArchived"], true);
    assert!(ctx.store.is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/documents/{}", cert_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);

    // Retrying after success is harmless
    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["documentArchived"], false);
}

#[actix_rt::test]
async fn test_unlink_stays_applied_when_blob_delete_fails() {
    let ctx = create_test_context().await;
    let store = FailingStorage::new(ctx.store.clone());
    let app = create_test_app_with_store(&ctx, std::sync::Arc::new(store.clone())).await;
    let (token, _) = signup(&app, "unlink-blob-down@example.com").await;

    let cv = upload_document(&app, &token, "cv", "CV", false).await;
    let cv_id = cv["data"]["id"].as_str().unwrap().to_string();

    let mut payload = job_payload("Engineer", "Acme");
    payload["documents"] = json!({ "cv": cv_id });
    let (_, body) = create_job(&app, &token, payload).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    store.fail_delete(true);
    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/jobs/{}/documents/{}?docType=cv&deletePermanently=true",
            job_id, cv_id
        ))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "{}", body);
    assert!(body["data"]["job"]["documents"]["cv"].is_null());
    assert_eq!(body["data"]["documentArchived"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/jobs/{}", job_id))
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert!(body["data"]["documents"]["cv"].is_null());
    assert_eq!(ctx.store.len(), 1);
}
