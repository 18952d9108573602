use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::{AnalyzeRequest, AppContext, InsightsResponse, ScansResponse, UpgradeRequest};
use detect::FileInput;
use lens_app::{AnalyzeInput, AppError, QuotaStatus, Result};
use lens_core::{ScanRecord, Tier};

pub async fn analyze(ctx: &AppContext, req: AnalyzeRequest) -> Result<ScanRecord> {
    let file = match req.file {
        Some(payload) => {
            let bytes = STANDARD
                .decode(payload.data_base64.as_bytes())
                .map_err(|err| {
                    AppError::InvalidInput(format!("invalid base64 image data: {}", err))
                })?;
            Some(FileInput {
                name: payload.name,
                content_type: payload.content_type,
                bytes,
            })
        }
        None => None,
    };
    ctx.app_state
        .services
        .scan
        .analyze(AnalyzeInput {
            file,
            url: req.url,
        })
        .await
}

pub fn quota_get(ctx: &AppContext) -> Result<QuotaStatus> {
    Ok(ctx.app_state.services.quota.status())
}

pub fn subscription_upgrade(ctx: &AppContext, req: UpgradeRequest) -> Result<QuotaStatus> {
    let tier = Tier::parse(req.tier.trim())
        .ok_or_else(|| AppError::InvalidInput(format!("unsupported tier {}", req.tier)))?;
    ctx.app_state.services.quota.upgrade(tier);
    Ok(ctx.app_state.services.quota.status())
}

pub fn scans_recent(ctx: &AppContext) -> Result<ScansResponse> {
    Ok(ScansResponse {
        scans: ctx.app_state.services.history.recent(),
    })
}

pub fn insights_get(ctx: &AppContext) -> Result<InsightsResponse> {
    Ok(InsightsResponse {
        insights: ctx.app_state.services.insights.current(),
    })
}
