//! Persistent blog entities and the database engine.

pub mod database;

use serde::{Deserialize, Serialize};

pub use database::{new_db_engine, DatabaseError, DbEngine};

/// A type stored in its own table.
pub trait Table {
    /// Singular table name without the configured prefix.
    const NAME: &'static str;
}

/// Columns shared by every blog table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: u32,
    pub created_by: String,
    pub modified_by: String,
    pub created_on: u32,
    pub modified_on: u32,
    pub deleted_on: u32,
    /// 0 = live, 1 = soft deleted.
    pub is_del: u8,
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.is_del != 0
    }
}

/// Article tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(flatten)]
    pub model: Model,
    pub name: String,
    /// 0 = disabled, 1 = enabled.
    pub state: u8,
}

impl Table for Tag {
    const NAME: &'static str = "tag";
}
