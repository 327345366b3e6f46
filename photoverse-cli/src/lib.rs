use std::ffi::OsStr;
use std::path::Path;

use surf::{StatusCode, Url};

use photoverse_api_structs::{LikeResponse, PhotoSummary, UploadResponse};

/// Thin client for the gallery's `/api/v1` endpoints.
pub struct ApiClient {
    base: Url,
    client: surf::Client,
}

impl ApiClient {
    pub fn new(endpoint: &str) -> surf::Result<Self> {
        let mut base = Url::parse(endpoint)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(ApiClient {
            base: base.join("api/v1/")?,
            client: surf::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> surf::Result<Url> {
        Ok(self.base.join(path)?)
    }

    /// `photo/<filename>[/<action>]`, with `filename` escaped as one path segment.
    pub fn photo_url(&self, filename: &str, action: Option<&str>) -> surf::Result<Url> {
        let mut url = self.url("photo/")?;
        url.path_segments_mut()
            .map_err(|_| surf::Error::from_str(StatusCode::BadRequest, "endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(filename)
            .extend(action);
        Ok(url)
    }

    pub async fn upload(&self, file_path: &Path, caption: &str) -> surf::Result<UploadResponse> {
        let name = file_path
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| {
                surf::Error::from_str(StatusCode::BadRequest, "path has no usable file name")
            })?;
        let data = async_std::fs::read(file_path).await?;
        log::debug!("Read {} bytes from {}", data.len(), file_path.display());

        let mut url = self.url("photos")?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("caption", caption);

        let mut res = self.client.post(url).body(data).await?;
        expect_status(&mut res, StatusCode::Created).await?;
        res.body_json().await
    }

    pub async fn list(&self) -> surf::Result<Vec<PhotoSummary>> {
        let mut res = self.client.get(self.url("photos")?).await?;
        expect_status(&mut res, StatusCode::Ok).await?;
        res.body_json().await
    }

    pub async fn like(&self, filename: &str) -> surf::Result<LikeResponse> {
        let url = self.photo_url(filename, Some("like"))?;
        let mut res = self.client.post(url).await?;
        expect_status(&mut res, StatusCode::Ok).await?;
        res.body_json().await
    }

    pub async fn delete(&self, filename: &str) -> surf::Result<()> {
        let url = self.photo_url(filename, None)?;
        let mut res = self.client.delete(url).await?;
        expect_status(&mut res, StatusCode::NoContent).await
    }
}

async fn expect_status(res: &mut surf::Response, expected: StatusCode) -> surf::Result<()> {
    if res.status() == expected {
        return Ok(());
    }

    let status = res.status();
    let body = res.body_string().await.unwrap_or_default();
    Err(surf::Error::from_str(
        status,
        format!("unexpected response {}: {}", status, body),
    ))
}
