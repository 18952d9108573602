mod history;
mod insights;
mod quota;
mod scan;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use detect::{Classifier, ImageFetcher, InsightGenerator};
use lens_db::Db;

pub use history::{HistoryService, MAX_RECENT_SCANS};
pub use insights::{INSIGHTS_UNAVAILABLE, InsightService};
pub use quota::{DAILY_FREE_LIMIT, QuotaService, QuotaStatus};
pub use scan::{AnalyzeInput, ScanService};

type SharedConfig = Arc<AppConfig>;

/// The opaque external collaborators, injected at composition time.
#[derive(Clone)]
pub struct ExternalClients {
    pub classifier: Arc<dyn Classifier>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub insights: Arc<dyn InsightGenerator>,
}

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub quota: QuotaService,
    pub history: HistoryService,
    pub insights: InsightService,
    pub scan: ScanService,
}

impl AppServices {
    pub fn new(config: &AppConfig, clients: ExternalClients) -> Self {
        let shared = Arc::new(config.clone());
        let quota = QuotaService::new(shared.clone());
        let history = HistoryService::new();
        let insights = InsightService::new(shared, clients.insights);
        let scan = ScanService::new(
            quota.clone(),
            history.clone(),
            insights.clone(),
            clients.classifier,
            clients.fetcher,
        );
        Self {
            quota,
            history,
            insights,
            scan,
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
