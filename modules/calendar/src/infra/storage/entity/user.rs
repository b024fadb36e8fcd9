use sea_orm::entity::prelude::*;

use crate::domain::repo::StoredUser;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub login: String,
    pub password_hash: String,
    pub timezone: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StoredUser {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            login: m.login,
            password_hash: m.password_hash,
            timezone: m.timezone,
        }
    }
}
