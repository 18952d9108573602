use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

/// A local image as the UI ships it over JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    pub name: String,
    pub content_type: String,
    pub data_base64: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub file: Option<FilePayload>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub tier: String,
}
