//! SQLite-backed warehouse store.
//!
//! A single connection owned by the batch driver. Every file is one
//! `BEGIN IMMEDIATE` .. `COMMIT` unit; statements inside a unit fail
//! individually without aborting it.

use super::models::*;
use super::schema::WAREHOUSE_VERSIONED_SCHEMAS;
use super::statements::Statements;
use super::trait_def::WarehouseStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

pub struct SqliteWarehouseStore {
    conn: Connection,
    statements: Statements,
}

fn create_or_validate_schema(conn: &Connection) -> Result<()> {
    let latest_version = WAREHOUSE_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &WAREHOUSE_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating warehouse db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has user_version {} and was not created by this tool",
            db_version
        );
    }
    let current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version != latest_version {
        bail!(
            "Database schema version {} does not match the supported version {}",
            current_version,
            latest_version
        );
    }

    latest_schema
        .validate(conn)
        .context("Warehouse schema validation failed")
}

impl SqliteWarehouseStore {
    /// Open (or create) the warehouse database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P, statements: Statements) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open warehouse database {:?}", db_path))?;
        Self::from_connection(conn, statements)
    }

    fn from_connection(conn: Connection, statements: Statements) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        create_or_validate_schema(&conn)?;

        let mut store = SqliteWarehouseStore { conn, statements };
        let counts = store.counts()?;
        info!("Opened warehouse: {}", counts);
        Ok(store)
    }

    fn in_unit_of_work(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn count_rows(&self, table: TargetTable) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.as_str()),
            [],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }
}

impl WarehouseStore for SqliteWarehouseStore {
    fn begin(&mut self) -> Result<()> {
        if self.in_unit_of_work() {
            bail!("A unit of work is already open");
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.in_unit_of_work() {
            bail!("No unit of work to commit");
        }
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(e).context("Failed to commit unit of work");
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.in_unit_of_work() {
            debug!("Rolling back unit of work");
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn insert_song(&mut self, song: &SongRecord) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&self.statements.song_insert)?;
        stmt.execute(params![
            &song.song_id,
            &song.title,
            &song.artist_id,
            song.year,
            song.duration
        ])?;
        Ok(())
    }

    fn insert_artist(&mut self, artist: &ArtistRecord) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&self.statements.artist_insert)?;
        stmt.execute(params![
            &artist.artist_id,
            &artist.name,
            &artist.location,
            artist.latitude,
            artist.longitude
        ])?;
        Ok(())
    }

    fn insert_time(&mut self, time: &TimeRecord) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&self.statements.time_insert)?;
        stmt.execute(params![
            &time.start_time,
            time.hour,
            time.day,
            time.week,
            time.month,
            time.year,
            time.weekday
        ])?;
        Ok(())
    }

    fn upsert_user(&mut self, user: &UserRecord) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&self.statements.user_insert)?;
        stmt.execute(params![
            &user.user_id,
            &user.first_name,
            &user.last_name,
            &user.gender,
            &user.level
        ])?;
        Ok(())
    }

    fn insert_songplay(&mut self, songplay: &SongplayFact) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&self.statements.songplay_insert)?;
        stmt.execute(params![
            &songplay.start_time,
            &songplay.user_id,
            &songplay.level,
            &songplay.song_id,
            &songplay.artist_id,
            songplay.session_id,
            &songplay.location,
            &songplay.user_agent
        ])?;
        Ok(())
    }

    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        length: f64,
        tolerance: f64,
    ) -> Result<Option<SongMatch>> {
        let mut stmt = self.conn.prepare_cached(&self.statements.song_select)?;
        let found = stmt
            .query_row(params![title, artist_name, length, tolerance], |row| {
                Ok(SongMatch {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()?;
        Ok(found)
    }

    fn counts(&mut self) -> Result<TableCounts> {
        Ok(TableCounts {
            songs: self.count_rows(TargetTable::Songs)?,
            artists: self.count_rows(TargetTable::Artists)?,
            users: self.count_rows(TargetTable::Users)?,
            time: self.count_rows(TargetTable::Time)?,
            songplays: self.count_rows(TargetTable::Songplays)?,
        })
    }
}
