use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: String,
    /// Delivery scope, see [`Audience`]
    pub audience: String,
    /// Set only for direct messages
    pub recipient_id: Option<Uuid>,
    pub body: String,
    pub sent_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Direct,
    AllSalesmen,
    AllManagers,
    AllStaff,
}

impl Model {
    pub fn audience(&self) -> Result<Audience, strum::ParseError> {
        Audience::from_str(&self.audience)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_string_forms() {
        assert_eq!(Audience::Direct.to_string(), "direct");
        assert_eq!(Audience::AllSalesmen.to_string(), "all_salesmen");
        assert_eq!(
            Audience::from_str("all_staff").unwrap(),
            Audience::AllStaff
        );
    }
}
