use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain::repo::StoredEvent;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(nullable)]
    pub alert_time: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StoredEvent {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            start_time: m.start_time,
            end_time: m.end_time,
            description: m.description,
            alert_time: m.alert_time,
        }
    }
}
