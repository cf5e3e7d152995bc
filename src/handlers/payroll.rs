use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::services::payroll::PayStatement;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// YYYY-MM; defaults to the current month
    pub month: Option<String>,
}

impl MonthQuery {
    pub fn month_or_current(&self) -> String {
        self.month
            .clone()
            .unwrap_or_else(|| Utc::now().format("%Y-%m").to_string())
    }
}

/// Owner: salary statement for any employee.
pub async fn employee_statement(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<PayStatement> {
    let statement = state
        .services
        .payroll
        .statement(employee_id, &query.month_or_current())
        .await?;
    Ok(Json(ApiResponse::success(statement)))
}

/// Manager and salesman: own statement for a month.
pub async fn my_statement(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MonthQuery>,
) -> ApiResult<PayStatement> {
    let statement = state
        .services
        .payroll
        .statement(user.user_id, &query.month_or_current())
        .await?;
    Ok(Json(ApiResponse::success(statement)))
}
