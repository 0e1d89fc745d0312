//! `reqwest` implementation of the API transport.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use api::{Body, FormValue, HttpRequest, HttpResponse, Method, MultipartForm, Transport, TransportError};
use reqwest::multipart::{Form, Part};

#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Convert the form field by field; reqwest picks the boundary.
fn to_multipart(form: MultipartForm) -> Result<Form, TransportError> {
    let mut out = Form::new();
    for (name, value) in form.fields {
        out = match value {
            FormValue::Text(text) => out.text(name, text),
            FormValue::File { file_name, content_type, bytes } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)
                    .map_err(|e| TransportError::Body(e.to_string()))?;
                out.part(name, part)
            }
        };
    }
    Ok(out)
}

#[async_trait::async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.body(value.to_string()),
            Body::Multipart(form) => builder.multipart(to_multipart(form)?),
        };

        let response = builder.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
        tracing::trace!(status, bytes = body.len(), "response received");
        Ok(HttpResponse { status, body })
    }
}
