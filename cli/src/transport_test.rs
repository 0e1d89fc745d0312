use super::*;

use api::types::Upload;

#[test]
fn methods_map_one_to_one() {
    assert_eq!(to_reqwest_method(Method::Get), reqwest::Method::GET);
    assert_eq!(to_reqwest_method(Method::Post), reqwest::Method::POST);
    assert_eq!(to_reqwest_method(Method::Patch), reqwest::Method::PATCH);
    assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
}

#[test]
fn multipart_accepts_text_and_image_parts() {
    let form = MultipartForm::new().text("content", "hello").file(
        "image",
        Upload { file_name: "a.png".to_owned(), content_type: "image/png".to_owned(), bytes: vec![1, 2, 3] },
    );
    assert!(to_multipart(form).is_ok());
}

#[test]
fn multipart_rejects_malformed_content_type() {
    let form = MultipartForm::new().file(
        "image",
        Upload { file_name: "a.bin".to_owned(), content_type: "not a mime".to_owned(), bytes: vec![0] },
    );
    assert!(matches!(to_multipart(form), Err(TransportError::Body(_))));
}
