//! Browser HTTP transport and the shared API handle.
//!
//! Client-side (csr): real HTTP calls via `gloo-net`, multipart bodies via
//! `FormData`.
//! Native builds (tests): the transport reports itself unavailable so pure
//! view helpers can be exercised without a browser.
//!
//! ERROR HANDLING
//! ==============
//! Network and body-building failures become `TransportError`; HTTP status
//! handling and token refresh happen in `api::ApiClient`.

#![allow(clippy::unused_async)]

use std::sync::Arc;

use api::{ApiClient, ApiConfig, HttpRequest, HttpResponse, Session, Transport, TransportError};
use leptos::prelude::*;

use crate::util::storage::LocalStorageStore;

/// Shared client handle provided through Leptos context.
pub type Api = Arc<ApiClient<BrowserTransport>>;

/// Fetch-backed transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait::async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "csr")]
        {
            use api::{Body, Method};
            use gloo_net::http::Request;

            let mut builder = match request.method {
                Method::Get => Request::get(&request.url),
                Method::Post => Request::post(&request.url),
                Method::Patch => Request::patch(&request.url),
                Method::Delete => Request::delete(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            let prepared = match request.body {
                Body::Empty => builder.build(),
                Body::Json(value) => builder.body(value.to_string()),
                Body::Multipart(form) => builder.body(form_data(&form)?),
            }
            .map_err(|e| TransportError::Body(e.to_string()))?;

            let response = prepared.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
            let status = response.status();
            let body = response.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
            Ok(HttpResponse { status, body })
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = request;
            Err(TransportError::Unavailable)
        }
    }
}

#[cfg(feature = "csr")]
fn form_data(form: &api::MultipartForm) -> Result<web_sys::FormData, TransportError> {
    use api::FormValue;

    let js_err = |e: wasm_bindgen::JsValue| TransportError::Body(format!("{e:?}"));
    let data = web_sys::FormData::new().map_err(js_err)?;
    for (name, value) in &form.fields {
        match value {
            FormValue::Text(text) => data.append_with_str(name, text).map_err(js_err)?,
            FormValue::File { file_name, content_type, bytes } => {
                let array = js_sys::Uint8Array::from(bytes.as_slice());
                let parts = js_sys::Array::of1(&array);
                let options = web_sys::BlobPropertyBag::new();
                options.set_type(content_type);
                let blob =
                    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;
                data.append_with_blob_and_filename(name, &blob, file_name).map_err(js_err)?;
            }
        }
    }
    Ok(data)
}

/// Build the process-wide client over `localStorage`.
pub fn connect() -> Api {
    let session = Session::new(Arc::new(LocalStorageStore));
    Arc::new(ApiClient::new(BrowserTransport, ApiConfig::default(), session))
}

/// The API handle from context.
pub fn use_api() -> Api {
    expect_context::<Api>()
}
