//! SeaORM Entity for the site_configs table.
//!
//! The table only ever holds a single row keyed by [`SINGLETON_KEY`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const SINGLETON_KEY: &str = "site_config";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "call_insights", table_name = "site_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub allowed_domains: Vec<String>,
    pub project_id: String,
    #[sea_orm(column_type = "Text")]
    pub prompt_summary: String,
    #[sea_orm(column_type = "Text")]
    pub prompt_action_items: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
