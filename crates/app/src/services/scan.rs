use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::error::{AppError, Result};
use crate::ids::random_hex;
use crate::services::{HistoryService, InsightService, QuotaService};
use detect::{Classifier, FileInput, ImageFetcher, NormalizedImage};
use lens_core::ScanRecord;

/// One analysis request. Exactly one of `file` and `url` must be set.
#[derive(Debug, Default)]
pub struct AnalyzeInput {
    pub file: Option<FileInput>,
    pub url: Option<String>,
}

/// Coordinates a scan end to end: admit against the quota, normalize the
/// input, classify, then record. One request is expected in flight per
/// instance at a time; the calling UI disables its trigger while a scan
/// runs, so no lock is taken here.
#[derive(Clone)]
pub struct ScanService {
    quota: QuotaService,
    history: HistoryService,
    insights: InsightService,
    classifier: Arc<dyn Classifier>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ScanService {
    pub(super) fn new(
        quota: QuotaService,
        history: HistoryService,
        insights: InsightService,
        classifier: Arc<dyn Classifier>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            quota,
            history,
            insights,
            classifier,
            fetcher,
        }
    }

    pub async fn analyze(&self, input: AnalyzeInput) -> Result<ScanRecord> {
        if !self.quota.can_scan() {
            return Err(AppError::QuotaExceeded);
        }

        let normalized = self.normalize(input).await?;

        // A failed classification consumes no quota.
        let raw = self
            .classifier
            .classify(&normalized.data_uri)
            .await
            .map_err(|err| AppError::classification(&err))?;
        let verdict = raw.into_verdict();

        self.quota.record_scan();

        let record = ScanRecord {
            id: random_hex(12),
            verdict,
            source_kind: normalized.source_kind,
            original_reference: normalized.original_reference,
            preview_payload: normalized.data_uri,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.history.record(record.clone());
        self.insights.refresh(self.history.usage_history());

        Ok(record)
    }

    async fn normalize(&self, input: AnalyzeInput) -> Result<NormalizedImage> {
        match (input.file, input.url) {
            (Some(file), None) => Ok(detect::normalize_file(&file)?),
            (None, Some(url)) => Ok(detect::normalize_url(&url, self.fetcher.as_ref()).await?),
            _ => Err(AppError::InvalidInput(
                "provide exactly one of file or url".to_string(),
            )),
        }
    }
}
