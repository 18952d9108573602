pub mod app;
pub mod error;
pub mod services;
pub mod startup;

mod ids;

pub use app::{AppConfig, AppState};
pub use error::{ApiError, AppError, Result};
pub use services::{
    AnalyzeInput, AppServices, DAILY_FREE_LIMIT, ExternalClients, HistoryService,
    INSIGHTS_UNAVAILABLE, InsightService, MAX_RECENT_SCANS, QuotaService, QuotaStatus,
    ScanService,
};
pub use startup::{AppPaths, ensure_app_data_dir};
