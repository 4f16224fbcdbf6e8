//! In-memory warehouse store.
//!
//! Same contract as `SqliteWarehouseStore`, without a database: units of work
//! are staged on a copy of the tables and swapped in on commit. Backs
//! `--dry-run` and the pipeline tests.

use super::models::*;
use super::trait_def::WarehouseStore;
use anyhow::{bail, Result};
use std::collections::{BTreeMap, HashSet};

#[derive(Clone, Debug, Default)]
struct Tables {
    songs: BTreeMap<String, SongRecord>,
    artists: BTreeMap<String, ArtistRecord>,
    users: BTreeMap<String, UserRecord>,
    time: BTreeMap<String, TimeRecord>,
    songplays: Vec<SongplayFact>,
}

#[derive(Debug, Default)]
pub struct InMemoryWarehouseStore {
    committed: Tables,
    pending: Option<Tables>,
    failing_tables: HashSet<TargetTable>,
}

impl InMemoryWarehouseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `table` fail, to exercise the error paths.
    pub fn with_failing_table(mut self, table: TargetTable) -> Self {
        self.failing_tables.insert(table);
        self
    }

    pub fn songs(&self) -> Vec<&SongRecord> {
        self.committed.songs.values().collect()
    }

    pub fn artists(&self) -> Vec<&ArtistRecord> {
        self.committed.artists.values().collect()
    }

    fn tables_for_write(&mut self, table: TargetTable) -> Result<&mut Tables> {
        if self.failing_tables.contains(&table) {
            bail!("write to {} rejected", table);
        }
        Ok(self.pending.as_mut().unwrap_or(&mut self.committed))
    }

    fn visible(&self) -> &Tables {
        self.pending.as_ref().unwrap_or(&self.committed)
    }
}

fn duration_matches(duration: f64, length: f64, tolerance: f64) -> bool {
    (duration - length).abs() <= tolerance
}

impl WarehouseStore for InMemoryWarehouseStore {
    fn begin(&mut self) -> Result<()> {
        if self.pending.is_some() {
            bail!("A unit of work is already open");
        }
        self.pending = Some(self.committed.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        match self.pending.take() {
            Some(tables) => {
                self.committed = tables;
                Ok(())
            }
            None => bail!("No unit of work to commit"),
        }
    }

    fn rollback(&mut self) -> Result<()> {
        self.pending = None;
        Ok(())
    }

    fn insert_song(&mut self, song: &SongRecord) -> Result<()> {
        let tables = self.tables_for_write(TargetTable::Songs)?;
        tables
            .songs
            .entry(song.song_id.clone())
            .or_insert_with(|| song.clone());
        Ok(())
    }

    fn insert_artist(&mut self, artist: &ArtistRecord) -> Result<()> {
        let tables = self.tables_for_write(TargetTable::Artists)?;
        tables
            .artists
            .entry(artist.artist_id.clone())
            .or_insert_with(|| artist.clone());
        Ok(())
    }

    fn insert_time(&mut self, time: &TimeRecord) -> Result<()> {
        let tables = self.tables_for_write(TargetTable::Time)?;
        tables
            .time
            .entry(time.start_time.clone())
            .or_insert_with(|| time.clone());
        Ok(())
    }

    fn upsert_user(&mut self, user: &UserRecord) -> Result<()> {
        let tables = self.tables_for_write(TargetTable::Users)?;
        tables
            .users
            .entry(user.user_id.clone())
            .and_modify(|existing| existing.level = user.level.clone())
            .or_insert_with(|| user.clone());
        Ok(())
    }

    fn insert_songplay(&mut self, songplay: &SongplayFact) -> Result<()> {
        let tables = self.tables_for_write(TargetTable::Songplays)?;
        tables.songplays.push(songplay.clone());
        Ok(())
    }

    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        length: f64,
        tolerance: f64,
    ) -> Result<Option<SongMatch>> {
        let tables = self.visible();
        let title = title.trim();
        let artist_name = artist_name.trim();

        let best = tables
            .songs
            .values()
            .filter(|song| song.title.trim() == title)
            .filter(|song| duration_matches(song.duration, length, tolerance))
            .filter(|song| {
                tables
                    .artists
                    .get(&song.artist_id)
                    .is_some_and(|artist| artist.name.trim() == artist_name)
            })
            // songs iterate in song_id order, so min_by keeps the lowest id on ties
            .min_by(|a, b| {
                (a.duration - length)
                    .abs()
                    .total_cmp(&(b.duration - length).abs())
            });

        Ok(best.map(|song| SongMatch {
            song_id: song.song_id.clone(),
            artist_id: song.artist_id.clone(),
        }))
    }

    fn counts(&mut self) -> Result<TableCounts> {
        let tables = self.visible();
        Ok(TableCounts {
            songs: tables.songs.len(),
            artists: tables.artists.len(),
            users: tables.users.len(),
            time: tables.time.len(),
            songplays: tables.songplays.len(),
        })
    }
}
