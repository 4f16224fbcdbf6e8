use crate::warehouse::TargetTable;
use std::collections::BTreeMap;
use std::fmt;

/// Outcome counters of one file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub rows_written: BTreeMap<TargetTable, usize>,
    pub rows_failed: BTreeMap<TargetTable, usize>,
    /// Rows that could not be derived from their event.
    pub rows_rejected: BTreeMap<TargetTable, usize>,
    /// Log events dropped because they are not plays.
    pub events_skipped: usize,
    /// Play events without a usable `ts`; nothing was derived from them.
    pub events_rejected: usize,
    /// Songplays written without a song/artist match.
    pub unresolved_plays: usize,
    /// Song file records after the first one.
    pub records_ignored: usize,
}

impl FileReport {
    pub fn record_write(&mut self, table: TargetTable, ok: bool) {
        let counter = if ok {
            &mut self.rows_written
        } else {
            &mut self.rows_failed
        };
        *counter.entry(table).or_default() += 1;
    }

    pub fn record_rejected(&mut self, table: TargetTable) {
        *self.rows_rejected.entry(table).or_default() += 1;
    }

    pub fn written(&self, table: TargetTable) -> usize {
        self.rows_written.get(&table).copied().unwrap_or(0)
    }

    pub fn failed(&self, table: TargetTable) -> usize {
        self.rows_failed.get(&table).copied().unwrap_or(0)
    }

    pub fn rejected(&self, table: TargetTable) -> usize {
        self.rows_rejected.get(&table).copied().unwrap_or(0)
    }
}

/// Aggregate over one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub files_found: usize,
    pub files_committed: usize,
    /// Files rejected as a whole (unreadable, malformed).
    pub files_failed: usize,
    pub totals: FileReport,
}

impl RunReport {
    pub fn absorb(&mut self, file: FileReport) {
        for (table, count) in file.rows_written {
            *self.totals.rows_written.entry(table).or_default() += count;
        }
        for (table, count) in file.rows_failed {
            *self.totals.rows_failed.entry(table).or_default() += count;
        }
        for (table, count) in file.rows_rejected {
            *self.totals.rows_rejected.entry(table).or_default() += count;
        }
        self.totals.events_skipped += file.events_skipped;
        self.totals.events_rejected += file.events_rejected;
        self.totals.unresolved_plays += file.unresolved_plays;
        self.totals.records_ignored += file.records_ignored;
    }

    pub fn merge(&mut self, other: RunReport) {
        self.files_found += other.files_found;
        self.files_committed += other.files_committed;
        self.files_failed += other.files_failed;
        self.absorb(other.totals);
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} files found, {} committed, {} rejected",
            self.files_found, self.files_committed, self.files_failed
        )?;
        for table in TargetTable::ALL {
            writeln!(
                f,
                "  {:<10} {} written, {} failed, {} rejected",
                table.as_str(),
                self.totals.written(table),
                self.totals.failed(table),
                self.totals.rejected(table)
            )?;
        }
        write!(
            f,
            "  {} plays unresolved, {} events rejected, {} non-play events skipped",
            self.totals.unresolved_plays, self.totals.events_rejected, self.totals.events_skipped
        )
    }
}
