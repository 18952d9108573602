use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::services::{SharedConfig, open_db};
use detect::InsightGenerator;
use lens_core::UsageHistoryEntry;
use lens_db::KEY_SUBJECT_ID;

/// Placeholder shown when the summarizer fails; never an API error.
pub const INSIGHTS_UNAVAILABLE: &str = "Could not load insights at this time.";

const FALLBACK_SUBJECT_ID: &str = "local";

#[derive(Default)]
struct InsightSlot {
    applied_seq: u64,
    text: Option<String>,
}

/// Fire-and-forget usage-summary refresh. Each request carries a sequence
/// number; a completion only lands if nothing newer has landed already, so
/// last-writer-wins is decided by issue order rather than arrival order.
#[derive(Clone)]
pub struct InsightService {
    config: SharedConfig,
    generator: Arc<dyn InsightGenerator>,
    slot: Arc<Mutex<InsightSlot>>,
    seq: Arc<AtomicU64>,
}

impl InsightService {
    pub(super) fn new(config: SharedConfig, generator: Arc<dyn InsightGenerator>) -> Self {
        Self {
            config,
            generator,
            slot: Arc::new(Mutex::new(InsightSlot::default())),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The latest applied summary, if any refresh has completed yet.
    pub fn current(&self) -> Option<String> {
        self.lock().text.clone()
    }

    /// Kick off a background refresh. Never blocks the caller and never
    /// surfaces an error; failures degrade to a static placeholder.
    pub fn refresh(&self, history: Vec<UsageHistoryEntry>) {
        if history.is_empty() {
            return;
        }
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let service = self.clone();
        tokio::spawn(async move {
            let subject_id = service.subject_id();
            let text = match service
                .generator
                .usage_insights(&subject_id, &history)
                .await
            {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!("insight refresh failed: {}", err);
                    INSIGHTS_UNAVAILABLE.to_string()
                }
            };
            service.apply(seq, text);
        });
    }

    fn apply(&self, seq: u64, text: String) {
        let mut slot = self.lock();
        if seq >= slot.applied_seq {
            slot.applied_seq = seq;
            slot.text = Some(text);
        }
    }

    fn subject_id(&self) -> String {
        open_db(&self.config)
            .ok()
            .and_then(|db| db.get_setting(KEY_SUBJECT_ID).ok().flatten())
            .unwrap_or_else(|| FALLBACK_SUBJECT_ID.to_string())
    }

    fn lock(&self) -> MutexGuard<'_, InsightSlot> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use async_trait::async_trait;
    use detect::InsightError;
    use std::path::PathBuf;
    use std::time::Duration;

    struct EchoGenerator;

    #[async_trait]
    impl InsightGenerator for EchoGenerator {
        async fn usage_insights(
            &self,
            _subject_id: &str,
            history: &[UsageHistoryEntry],
        ) -> Result<String, InsightError> {
            Ok(format!("{} scans analyzed", history.len()))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl InsightGenerator for FailingGenerator {
        async fn usage_insights(
            &self,
            _subject_id: &str,
            _history: &[UsageHistoryEntry],
        ) -> Result<String, InsightError> {
            Err(InsightError::Network("unreachable".to_string()))
        }
    }

    fn service(generator: Arc<dyn InsightGenerator>) -> InsightService {
        let config = Arc::new(AppConfig {
            db_path: PathBuf::from("/nonexistent/lens.sqlite"),
        });
        InsightService::new(config, generator)
    }

    fn entry() -> UsageHistoryEntry {
        UsageHistoryEntry {
            is_ai_generated: true,
            timestamp: "2026-08-07T10:00:00Z".to_string(),
        }
    }

    async fn wait_for_text(service: &InsightService) -> String {
        for _ in 0..100 {
            if let Some(text) = service.current() {
                return text;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("insight refresh never completed");
    }

    #[test]
    fn stale_completion_never_overwrites_newer_text() {
        let service = service(Arc::new(EchoGenerator));

        service.apply(2, "newer".to_string());
        service.apply(1, "older".to_string());

        assert_eq!(service.current(), Some("newer".to_string()));
    }

    #[test]
    fn later_completion_replaces_earlier_text() {
        let service = service(Arc::new(EchoGenerator));

        service.apply(1, "first".to_string());
        service.apply(2, "second".to_string());

        assert_eq!(service.current(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn refresh_applies_the_generated_summary() {
        let service = service(Arc::new(EchoGenerator));

        service.refresh(vec![entry(), entry()]);

        assert_eq!(wait_for_text(&service).await, "2 scans analyzed");
    }

    #[tokio::test]
    async fn failure_degrades_to_the_placeholder() {
        let service = service(Arc::new(FailingGenerator));

        service.refresh(vec![entry()]);

        assert_eq!(wait_for_text(&service).await, INSIGHTS_UNAVAILABLE);
    }

    #[tokio::test]
    async fn empty_history_is_not_summarized() {
        let service = service(Arc::new(EchoGenerator));

        service.refresh(Vec::new());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(service.current(), None);
    }
}
