//! Mobile push token entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Device token used to reach a user with push notifications.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mobile_token")]
pub struct Model {
    /// Owner of the device.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Push token issued to the device.
    #[sea_orm(column_type = "Text")]
    pub mobile_token: String,
    /// When the token was first registered.
    pub created_at: DateTimeWithTimeZone,
    /// When the token was last replaced.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
