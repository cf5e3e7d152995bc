use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Staff role: "manager" or "salesman"
    pub role: String,
    pub branch_id: Option<Uuid>,
    pub base_salary: Decimal,
    /// Lifecycle status: "active", "resigned" or "fired"
    pub status: String,
    pub joined_at: DateTimeWithTimeZone,
    pub separated_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Manager,
    Salesman,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Resigned,
    Fired,
}

impl EmployeeStatus {
    /// Resigned and fired are terminal; an employee never returns to active.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EmployeeStatus::Resigned | EmployeeStatus::Fired)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, EmployeeStatus::Active)
    }
}

impl Model {
    pub fn status(&self) -> Result<EmployeeStatus, strum::ParseError> {
        EmployeeStatus::from_str(&self.status)
    }

    pub fn staff_role(&self) -> Result<StaffRole, strum::ParseError> {
        StaffRole::from_str(&self.role)
    }

    pub fn is_active(&self) -> bool {
        self.status()
            .map(|s| s.is_active())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(EmployeeStatus::Active.to_string(), "active");
        assert_eq!(
            EmployeeStatus::from_str("resigned").unwrap(),
            EmployeeStatus::Resigned
        );
        assert!(EmployeeStatus::from_str("retired").is_err());
    }

    #[test]
    fn separated_statuses_are_terminal() {
        assert!(!EmployeeStatus::Active.is_terminal());
        assert!(EmployeeStatus::Resigned.is_terminal());
        assert!(EmployeeStatus::Fired.is_terminal());
    }
}
