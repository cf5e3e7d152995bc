use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sale_number: String,
    pub branch_id: Uuid,
    pub salesman_id: Uuid,
    pub product_id: Uuid,
    pub company_id: Uuid,
    /// Buyer details captured at point of sale
    pub customer_name: String,
    pub customer_phone: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub profit_or_loss: Decimal,
    pub installation_required: bool,
    /// Set only when installation_required: "pending" or "completed"
    pub installation_status: Option<String>,
    pub review: Option<String>,
    pub sold_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::SalesmanId",
        to = "super::employee::Column::Id"
    )]
    Salesman,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InstallationStatus {
    Pending,
    Completed,
}

impl Model {
    pub fn installation_status(&self) -> Option<InstallationStatus> {
        self.installation_status
            .as_deref()
            .and_then(|s| InstallationStatus::from_str(s).ok())
    }
}
