use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{AssetRef, DeleteError, DeleteResult, ImageBlob, UploadError, UploadResult};
use crate::config::AppConfig;

const CSRF_HEADER: &str = "X-CSRFToken";
const UPLOAD_FIELD: &str = "file";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote store for post images. Calls block; [`super::UploadService`] runs
/// them on worker threads.
pub trait BlobStore: Send + Sync {
    fn store(&self, blob: &ImageBlob) -> UploadResult<AssetRef>;
    fn delete(&self, reference: &AssetRef) -> DeleteResult<()>;
}

#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: Client,
    upload_url: String,
    delete_url: String,
    csrf_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpBlobStore {
    pub fn new(config: &AppConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            upload_url: endpoint_url(&config.base_url, &config.upload_path),
            delete_url: endpoint_url(&config.base_url, &config.delete_path),
            csrf_token: config.csrf_token.clone().filter(|token| !token.is_empty()),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub fn delete_url(&self) -> &str {
        &self.delete_url
    }

    fn with_csrf(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.csrf_token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }
}

impl BlobStore for HttpBlobStore {
    fn store(&self, blob: &ImageBlob) -> UploadResult<AssetRef> {
        let part = multipart::Part::bytes(blob.bytes().to_vec())
            .file_name(blob.filename().to_string())
            .mime_str(blob.mime_type())?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .with_csrf(self.client.post(&self.upload_url))
            .multipart(form)
            .send()?;
        let status = response.status();
        let body = response.json::<UploadResponse>().unwrap_or_else(|err| {
            tracing::debug!(?err, %status, "upload response body is not JSON");
            UploadResponse::default()
        });
        interpret_upload_response(status, body)
    }

    fn delete(&self, reference: &AssetRef) -> DeleteResult<()> {
        let response = self
            .with_csrf(self.client.post(&self.delete_url))
            .json(&json!({ "url": reference.as_str() }))
            .send()?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeleteError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

fn interpret_upload_response(status: StatusCode, body: UploadResponse) -> UploadResult<AssetRef> {
    if !status.is_success() {
        return Err(UploadError::Rejected {
            status: status.as_u16(),
            message: body
                .error
                .unwrap_or_else(|| format!("server error: {}", status.as_u16())),
        });
    }
    body.location
        .as_deref()
        .and_then(AssetRef::parse)
        .ok_or_else(|| UploadError::MissingLocation {
            message: body.error.unwrap_or_else(|| "unknown error".to_string()),
        })
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
