//! Database models.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// One completed level for one player key.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::completed_levels)]
pub struct CompletedLevel {
    id: i32,
    player_key: String,
    level_id: i32,
    completed_at: NaiveDateTime,
}

/// Insertable completion row. `completed_at` is filled by the database.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::completed_levels)]
pub struct NewCompletedLevel {
    player_key: String,
    level_id: i32,
}
