use std::sync::{Arc, Mutex, MutexGuard};

use lens_core::{ScanRecord, UsageHistoryEntry};

pub const MAX_RECENT_SCANS: usize = 10;

/// In-memory, size-bounded, most-recent-first list of completed scans.
/// Records are only ever appended; the oldest fall off the end.
#[derive(Clone, Default)]
pub struct HistoryService {
    records: Arc<Mutex<Vec<ScanRecord>>>,
}

impl HistoryService {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: ScanRecord) {
        let mut records = self.lock();
        records.insert(0, record);
        records.truncate(MAX_RECENT_SCANS);
    }

    pub fn recent(&self) -> Vec<ScanRecord> {
        self.lock().clone()
    }

    /// Lossy projection used for insight generation.
    pub fn usage_history(&self) -> Vec<UsageHistoryEntry> {
        self.lock()
            .iter()
            .map(|scan| UsageHistoryEntry {
                is_ai_generated: scan.verdict.is_ai_generated,
                timestamp: scan.created_at.clone(),
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ScanRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
