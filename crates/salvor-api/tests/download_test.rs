//! Results and download integration tests.
//!
//! Run with: `cargo test -p salvor-api --test download_test`

mod helpers;

use helpers::fixtures::upload_image;
use helpers::setup_test_app;
use uuid::Uuid;

fn place_recovered_file(app: &helpers::TestApp, upload_id: Uuid, name: &str, contents: &[u8]) {
    let dir = app
        .data_dir()
        .join("recovered_files")
        .join(upload_id.to_string());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), contents).unwrap();
}

#[tokio::test]
async fn test_unrecorded_file_on_disk_is_downloadable() {
    let app = setup_test_app().await;
    let id = Uuid::new_v4();
    place_recovered_file(&app, id, "stray.bin", b"not in the database");

    let response = app
        .client()
        .get(&format!("/download/{}/stray.bin", id))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), b"not in the database");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"stray.bin\""
    );
    assert_eq!(
        response.header("content-type"),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let app = setup_test_app().await;
    let id = Uuid::new_v4();
    std::fs::write(app.data_dir().join("secret.txt"), b"secret").unwrap();

    let response = app
        .client()
        .get(&format!("/download/{}/..%2F..%2Fsecret.txt", id))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(!response.text().contains("secret"));
}

#[tokio::test]
async fn test_download_name_with_double_dots_is_served() {
    let app = setup_test_app().await;
    let id = Uuid::new_v4();
    place_recovered_file(&app, id, "report..v2.txt", b"second draft");

    let response = app
        .client()
        .get(&format!("/download/{}/report..v2.txt", id))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), b"second draft");
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&format!("/download/{}/f0001.jpg", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = setup_test_app().await;
    let client = app.client();

    assert_eq!(client.get("/results/not-a-uuid").await.status_code(), 400);
    assert_eq!(client.get("/recover/not-a-uuid").await.status_code(), 400);
    assert_eq!(
        client.get("/download/not-a-uuid/f0001.jpg").await.status_code(),
        400
    );
}

#[tokio::test]
async fn test_results_for_unknown_upload_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&format!("/results/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_results_for_pending_upload_renders_empty() {
    let app = setup_test_app().await;
    let client = app.client();
    let id = upload_image(client, &app.state, "card.img").await;

    let response = client.get(&format!("/results/{}", id)).await;

    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("No files recovered."));
}
