/// One gallery entry as served by `GET /api/v1/photos`.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PhotoSummary {
    pub filename: String,
    pub url: String,
    pub original_name: String,
    pub caption: String,
    pub likes: u64,
    pub uploaded_at: f64,
}

#[derive(Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct UploadResponse {
    pub filename: String,
}

#[derive(Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct LikeResponse {
    pub filename: String,
    pub likes: u64,
}

/// Query string accompanying a raw-body upload.
#[derive(Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct UploadQuery {
    pub name: Option<String>,
    pub caption: String,
}
