use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub model: String,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    /// Owner review state: "hold", "accepted" or "rejected"
    pub approval_status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// New products start on hold and only become sellable once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Hold,
    Accepted,
    Rejected,
}

impl ApprovalStatus {
    pub fn is_reviewed(&self) -> bool {
        !matches!(self, ApprovalStatus::Hold)
    }
}

impl Model {
    pub fn approval_status(&self) -> Result<ApprovalStatus, strum::ParseError> {
        ApprovalStatus::from_str(&self.approval_status)
    }

    pub fn is_accepted(&self) -> bool {
        self.approval_status()
            .map(|s| s == ApprovalStatus::Accepted)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_status_serializes_snake_case() {
        assert_eq!(ApprovalStatus::Hold.to_string(), "hold");
        assert_eq!(
            ApprovalStatus::from_str("accepted").unwrap(),
            ApprovalStatus::Accepted
        );
    }

    #[test]
    fn only_hold_is_unreviewed() {
        assert!(!ApprovalStatus::Hold.is_reviewed());
        assert!(ApprovalStatus::Accepted.is_reviewed());
        assert!(ApprovalStatus::Rejected.is_reviewed());
    }
}
