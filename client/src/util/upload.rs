//! File-input helpers for post images and avatars.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use crate::net::types::Upload;

/// Only image files are accepted for posts and avatars.
pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Read a selected file into memory for a multipart upload.
#[cfg(feature = "csr")]
pub async fn read_file(file: &web_sys::File) -> Option<Upload> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer()).await.ok()?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let content_type = file.type_();
    if !is_image(&content_type) {
        log::warn!("rejected non-image upload: {content_type}");
        return None;
    }
    Some(Upload { file_name: file.name(), content_type, bytes })
}

/// First file chosen in the input that fired `ev`.
#[cfg(feature = "csr")]
pub fn selected_file(ev: &leptos::ev::Event) -> Option<web_sys::File> {
    let input: web_sys::HtmlInputElement = leptos::prelude::event_target(ev);
    input.files()?.get(0)
}

/// Object URL for a local preview of `file`.
#[cfg(feature = "csr")]
pub fn preview_url(file: &web_sys::File) -> Option<String> {
    web_sys::Url::create_object_url_with_blob(file).ok()
}

/// Describe a pending upload for the form.
pub fn describe(upload: Option<&Upload>) -> String {
    upload.map_or_else(String::new, |u| format!("{} ({} KB)", u.file_name, u.bytes.len().div_ceil(1024)))
}
