//! Request bodies and uploads shared by the integration tests

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use uuid::Uuid;

/// A small fake disk image
pub fn disk_image() -> Vec<u8> {
    let mut image = vec![0u8; 4096];
    image[510] = 0x55;
    image[511] = 0xAA;
    image
}

pub fn image_form(filename: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes)
            .file_name(filename)
            .mime_type("application/octet-stream"),
    )
}

/// Upload an image through the form endpoint and return the new upload's id
pub async fn upload_image(server: &TestServer, state: &salvor_api::AppState, filename: &str) -> Uuid {
    let before: Vec<Uuid> = state
        .db
        .uploads
        .list_uploads()
        .await
        .expect("Failed to list uploads")
        .into_iter()
        .map(|u| u.id)
        .collect();

    let response = server
        .post("/upload")
        .multipart(image_form(filename, disk_image()))
        .await;
    assert_eq!(response.status_code(), 303, "upload failed: {}", response.text());

    state
        .db
        .uploads
        .list_uploads()
        .await
        .expect("Failed to list uploads")
        .into_iter()
        .map(|u| u.id)
        .find(|id| !before.contains(id))
        .expect("upload was not recorded")
}
