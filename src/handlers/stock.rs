use axum::{extract::State, response::Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::company::{self, Entity as CompanyEntity};
use crate::entities::product::{self, Entity as ProductEntity};
use crate::entities::stock_level::Model as StockModel;
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState};

/// Stock row with product and company names resolved for display.
#[derive(Debug, Serialize)]
pub struct StockView {
    #[serde(flatten)]
    pub stock: StockModel,
    pub product_name: Option<String>,
    pub company_name: Option<String>,
}

/// Manager and salesman view: stock of the caller's branch.
pub async fn branch_stock(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<StockView>> {
    let branch_id = user.require_branch()?;
    let rows = state.services.stock.stock_for_branch(branch_id).await?;
    let views = resolve_names(&state, rows).await?;
    Ok(Json(ApiResponse::success(views)))
}

/// Company view: per-branch stock of the company's own products.
pub async fn company_stock(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<StockView>> {
    let rows = state.services.stock.stock_for_company(user.user_id).await?;
    let views = resolve_names(&state, rows).await?;
    Ok(Json(ApiResponse::success(views)))
}

/// Owner view: every stock row across all branches.
pub async fn all_stock(State(state): State<AppState>) -> ApiResult<Vec<StockView>> {
    let rows = state.services.stock.all_stock().await?;
    let views = resolve_names(&state, rows).await?;
    Ok(Json(ApiResponse::success(views)))
}

async fn resolve_names(
    state: &AppState,
    rows: Vec<StockModel>,
) -> Result<Vec<StockView>, ServiceError> {
    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
    let company_ids: Vec<Uuid> = rows.iter().map(|r| r.company_id).collect();

    let mut product_names: HashMap<Uuid, String> = HashMap::new();
    if !product_ids.is_empty() {
        for p in ProductEntity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(&*state.db)
            .await?
        {
            product_names.insert(p.id, p.name);
        }
    }

    let mut company_names: HashMap<Uuid, String> = HashMap::new();
    if !company_ids.is_empty() {
        for c in CompanyEntity::find()
            .filter(company::Column::Id.is_in(company_ids))
            .all(&*state.db)
            .await?
        {
            company_names.insert(c.id, c.name);
        }
    }

    Ok(rows
        .into_iter()
        .map(|r| {
            let product_name = product_names.get(&r.product_id).cloned();
            let company_name = company_names.get(&r.company_id).cloned();
            StockView {
                stock: r,
                product_name,
                company_name,
            }
        })
        .collect())
}
