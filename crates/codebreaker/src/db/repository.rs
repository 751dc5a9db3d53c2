//! Database repository for completed levels.

use std::collections::BTreeSet;

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{CompletedLevel, DbError, DbErrorKind, NewCompletedLevel, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for level completion records.
///
/// Opens a fresh connection per call, so clones are cheap and share nothing.
#[derive(Debug, Clone)]
pub struct ProgressRepository {
    db_path: String,
}

impl ProgressRepository {
    /// Creates a repository for the database at `db_path` without touching it.
    ///
    /// Use `":memory:"` only for single-call experiments; every call opens a
    /// new connection, so in-memory data does not survive between calls.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Self {
        info!(path = %db_path, "Creating ProgressRepository");
        Self { db_path }
    }

    /// Creates a repository and applies any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repository = Self::new(db_path);
        repository.migrate()?;
        Ok(repository)
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, e.to_string()))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(DbErrorKind::Connection, format!("'{}': {}", self.db_path, e))
        })
    }

    /// Completion rows for a player, ordered by level id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn completions(&self, player_key: &str) -> Result<Vec<CompletedLevel>, DbError> {
        let mut conn = self.connection()?;
        let rows = schema::completed_levels::table
            .filter(schema::completed_levels::player_key.eq(player_key))
            .order(schema::completed_levels::level_id.asc())
            .select(CompletedLevel::as_select())
            .load(&mut conn)?;
        debug!(count = rows.len(), "Completions loaded");
        Ok(rows)
    }

    /// Completed level ids for a player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn completed_level_ids(&self, player_key: &str) -> Result<BTreeSet<u32>, DbError> {
        let ids = self
            .completions(player_key)?
            .into_iter()
            .filter_map(|row| match u32::try_from(*row.level_id()) {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(level_id = row.level_id(), "Skipping negative level id");
                    None
                }
            })
            .collect();
        Ok(ids)
    }

    /// Whether any completion is stored for the player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn has_player(&self, player_key: &str) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let found = diesel::select(diesel::dsl::exists(
            schema::completed_levels::table
                .filter(schema::completed_levels::player_key.eq(player_key)),
        ))
        .get_result::<bool>(&mut conn)?;
        Ok(found)
    }

    /// Records a completion. Returns `false` if it was already recorded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the id does not fit the column or a database
    /// error occurs.
    #[instrument(skip(self))]
    pub fn mark_completed(&self, player_key: &str, level_id: u32) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let inserted = insert_ignoring_duplicates(&mut conn, player_key, level_id)?;
        info!(player_key, level_id, inserted, "Completion recorded");
        Ok(inserted)
    }

    /// Adds every id in `level_ids` to the player's record. Returns the number
    /// of new rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; no rows are written then.
    #[instrument(skip(self, level_ids), fields(count = level_ids.len()))]
    pub fn import(&self, player_key: &str, level_ids: &BTreeSet<u32>) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let added = conn.transaction::<_, DbError, _>(|conn| {
            let mut added = 0;
            for &level_id in level_ids {
                if insert_ignoring_duplicates(conn, player_key, level_id)? {
                    added += 1;
                }
            }
            Ok(added)
        })?;
        info!(player_key, added, "Completions imported");
        Ok(added)
    }

    /// Makes the player's record exactly `level_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; the old record is kept then.
    #[instrument(skip(self, level_ids), fields(count = level_ids.len()))]
    pub fn replace(&self, player_key: &str, level_ids: &BTreeSet<u32>) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        conn.transaction::<_, DbError, _>(|conn| {
            let removed = diesel::delete(
                schema::completed_levels::table
                    .filter(schema::completed_levels::player_key.eq(player_key)),
            )
            .execute(conn)?;
            debug!(removed, "Cleared previous completions");
            for &level_id in level_ids {
                insert_ignoring_duplicates(conn, player_key, level_id)?;
            }
            Ok(())
        })?;
        info!(player_key, "Completions replaced");
        Ok(())
    }
}

fn insert_ignoring_duplicates(
    conn: &mut SqliteConnection,
    player_key: &str,
    level_id: u32,
) -> Result<bool, DbError> {
    let level_id = i32::try_from(level_id)
        .map_err(|_| DbError::level_out_of_range(level_id))?;
    let row = NewCompletedLevel::new(player_key.to_string(), level_id);
    let written = diesel::insert_or_ignore_into(schema::completed_levels::table)
        .values(&row)
        .execute(conn)?;
    Ok(written > 0)
}
