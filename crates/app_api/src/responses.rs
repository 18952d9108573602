use serde::Serialize;

use lens_core::ScanRecord;

#[derive(Serialize)]
pub struct ScansResponse {
    pub scans: Vec<ScanRecord>,
}

#[derive(Serialize)]
pub struct InsightsResponse {
    pub insights: Option<String>,
}
