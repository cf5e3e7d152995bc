use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::auth::AuthUser;
use crate::handlers::payroll::MonthQuery;
use crate::services::analytics::{BranchSummary, BusinessSummary};
use crate::{ApiResponse, ApiResult, AppState};

/// Owner: business-wide dashboard figures.
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<BusinessSummary> {
    let summary = state
        .services
        .analytics
        .summary(&query.month_or_current())
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Owner: per-branch revenue and profit for a month.
pub async fn branch_summaries(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Vec<BranchSummary>> {
    let summaries = state
        .services
        .analytics
        .branch_summaries(&query.month_or_current())
        .await?;
    Ok(Json(ApiResponse::success(summaries)))
}

/// Manager: the caller's branch summary for a month.
pub async fn my_branch_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MonthQuery>,
) -> ApiResult<BranchSummary> {
    let branch_id = user.require_branch()?;
    let summary = state
        .services
        .analytics
        .branch_month(branch_id, &query.month_or_current())
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}
