//! Chapter, page and comment API tests.

mod common;

use axum::http::StatusCode;
use common::{MultipartBody, TestServer};
use serde_json::json;

#[tokio::test]
async fn test_chapter_pages_follow_upload_order() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Reader").await;

    let created = server
        .multipart(
            "POST",
            "/api/admin/chapter",
            MultipartBody::new()
                .text("manga_id", &manga.to_string())
                .text("chapter_number", "1")
                .text("title", "Beginnings")
                .file("pages", "z-last-name.png", b"first")
                .file("pages", "a-first-name.png", b"second")
                .file("pages", "m.png", b"third"),
            Some(&cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["page_count"], 3);
    let chapter = created.body["id"].as_i64().unwrap();

    let detail = server.get(&format!("/api/chapter/{chapter}")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["title"], "Beginnings");
    assert_eq!(detail.body["manga_title"], "Reader");
    assert_eq!(detail.body["comments"], json!([]));

    let pages = detail.body["pages"].as_array().unwrap();
    let numbers: Vec<_> = pages.iter().map(|p| p["page_number"].as_i64().unwrap()).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(pages[0]["image_path"].as_str().unwrap().ends_with("-z-last-name.png"));
    assert!(pages[1]["image_path"].as_str().unwrap().ends_with("-a-first-name.png"));

    let first_page = server.get(pages[0]["image_path"].as_str().unwrap()).await;
    assert_eq!(first_page.text, "first");
}

#[tokio::test]
async fn test_chapter_without_pages() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Sparse").await;

    let chapter = server.create_chapter(&cookie, manga, "0.5", 0).await;

    let detail = server.get(&format!("/api/chapter/{chapter}")).await;
    assert_eq!(detail.body["chapter_number"], 0.5);
    assert_eq!(detail.body["pages"], json!([]));
}

#[tokio::test]
async fn test_too_many_pages_rejected() {
    let server = TestServer::with_config(|config| config.uploads.max_pages = 3).await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Thick").await;

    let mut form = MultipartBody::new()
        .text("manga_id", &manga.to_string())
        .text("chapter_number", "1")
        .text("title", "Too long");
    for index in 0..4 {
        form = form.file("pages", &format!("{index}.png"), b"x");
    }

    let response = server
        .multipart("POST", "/api/admin/chapter", form, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let detail = server.get(&format!("/api/manga/{manga}")).await;
    assert_eq!(detail.body["chapters"], json!([]));
}

#[tokio::test]
async fn test_chapter_for_unknown_manga() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;

    let response = server
        .multipart(
            "POST",
            "/api/admin/chapter",
            MultipartBody::new()
                .text("manga_id", "99")
                .text("chapter_number", "1")
                .text("title", "Orphan"),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Manga not found");
}

#[tokio::test]
async fn test_chapter_fields_are_validated() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Strict").await;

    let missing_title = server
        .multipart(
            "POST",
            "/api/admin/chapter",
            MultipartBody::new()
                .text("manga_id", &manga.to_string())
                .text("chapter_number", "1"),
            Some(&cookie),
        )
        .await;
    assert_eq!(missing_title.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_title.body["error"], "title is required");

    let bad_number = server
        .multipart(
            "POST",
            "/api/admin/chapter",
            MultipartBody::new()
                .text("manga_id", &manga.to_string())
                .text("chapter_number", "one")
                .text("title", "Bad"),
            Some(&cookie),
        )
        .await;
    assert_eq!(bad_number.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_chapter_metadata() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Editable").await;
    let chapter = server.create_chapter(&cookie, manga, "1", 2).await;

    let response = server
        .json(
            "PUT",
            &format!("/api/admin/chapter/{chapter}"),
            Some(json!({ "chapter_number": 3.5, "title": "Renamed" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));

    let detail = server.get(&format!("/api/chapter/{chapter}")).await;
    assert_eq!(detail.body["chapter_number"], 3.5);
    assert_eq!(detail.body["title"], "Renamed");
    assert_eq!(detail.body["pages"].as_array().unwrap().len(), 2);

    let missing = server
        .json(
            "PUT",
            "/api/admin/chapter/999",
            Some(json!({ "chapter_number": 1, "title": "Nope" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_chapter_cascades() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Pruned").await;
    let chapter = server.create_chapter(&cookie, manga, "1", 2).await;

    server
        .json(
            "POST",
            "/api/comment",
            Some(json!({ "chapter_id": chapter, "username": "a", "comment": "b" })),
            None,
        )
        .await;

    let deleted = server
        .json("DELETE", &format!("/api/admin/chapter/{chapter}"), None, Some(&cookie))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    assert_eq!(
        server.get(&format!("/api/chapter/{chapter}")).await.status,
        StatusCode::NOT_FOUND
    );
    let repo = server.state.repo();
    assert!(repo.list_pages(chapter as i32).await.unwrap().is_empty());
    assert!(repo.list_comments(chapter as i32).await.unwrap().is_empty());

    let detail = server.get(&format!("/api/manga/{manga}")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["chapters"], json!([]));
}

#[tokio::test]
async fn test_unknown_chapter() {
    let server = TestServer::new().await;

    let response = server.get("/api/chapter/7").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Chapter not found");
}

#[tokio::test]
async fn test_comments_newest_first() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Chatty").await;
    let chapter = server.create_chapter(&cookie, manga, "1", 1).await;

    for text in ["first!", "second", "third"] {
        let response = server
            .json(
                "POST",
                "/api/comment",
                Some(json!({ "chapter_id": chapter, "username": "reader", "comment": text })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["comment"], text);
    }

    let detail = server.get(&format!("/api/chapter/{chapter}")).await;
    let comments: Vec<_> = detail.body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["comment"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(comments, vec!["third", "second", "first!"]);
}

#[tokio::test]
async fn test_blank_comment_rejected() {
    let server = TestServer::new().await;
    let cookie = server.admin_cookie().await;
    let manga = server.create_manga(&cookie, "Quiet").await;
    let chapter = server.create_chapter(&cookie, manga, "1", 0).await;

    let empty = server
        .json(
            "POST",
            "/api/comment",
            Some(json!({ "chapter_id": chapter, "username": "reader", "comment": "" })),
            None,
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"], "Username and comment are required");

    let no_name = server
        .json(
            "POST",
            "/api/comment",
            Some(json!({ "chapter_id": chapter, "username": "  ", "comment": "hello" })),
            None,
        )
        .await;
    assert_eq!(no_name.status, StatusCode::BAD_REQUEST);

    assert!(server
        .state
        .repo()
        .list_comments(chapter as i32)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_comment_on_unknown_chapter() {
    let server = TestServer::new().await;

    let response = server
        .json(
            "POST",
            "/api/comment",
            Some(json!({ "chapter_id": 404, "username": "reader", "comment": "hello?" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Chapter not found");
}
