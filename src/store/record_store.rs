use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::StringRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::schema::{
    self, Entry, FieldError, ID_FIELD, Provenance, Record, RecordId, RecordStatus, Row,
};
use crate::ui::console::{Console, Tone};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("record {0} is protected and cannot be deleted")]
    Protected(RecordId),
    #[error("loading `{name}` aborted at data row {row}")]
    Aborted { name: String, row: usize },
    #[error("no record IDs left in `{0}`")]
    IdsExhausted(String),
}

/// Why a data row was rejected during load.
#[derive(Debug, Error)]
enum RowError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("missing or non-numeric ID `{0}`")]
    BadId(String),
    #[error("ID must be positive")]
    ZeroId,
    #[error("duplicate ID {0}")]
    DuplicateId(RecordId),
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// How `save` is allowed to interact with the operator.
pub enum SaveMode<'a> {
    Interactive(&'a mut dyn Console),
    Silent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    NothingToSave,
    Saved,
    Discarded,
    Cancelled,
}

impl SaveOutcome {
    /// Everything except a cancelled save lets the caller leave the screen.
    pub fn is_success(self) -> bool {
        !matches!(self, SaveOutcome::Cancelled)
    }
}

#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub data_dir: PathBuf,
    pub delimiter: u8,
    pub rows_per_page: usize,
}

impl StoreOptions {
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.csv"))
    }
}

/// An ordered, flat-file-backed collection of typed records.
pub struct RecordStore<R: Record> {
    options: StoreOptions,
    name: String,
    entries: Vec<(RecordId, Entry<R>)>,
    next_id: RecordId,
    dirty: bool,
    provenance: Provenance,
    current_page: usize,
}

impl<R: Record> RecordStore<R> {
    /// An empty, unsaved store. Nothing is read from disk.
    pub fn new(options: StoreOptions, name: &str) -> Self {
        Self {
            options,
            name: name.to_string(),
            entries: Vec::new(),
            next_id: 0,
            dirty: false,
            provenance: Provenance::default(),
            current_page: 0,
        }
    }

    pub fn open(
        options: StoreOptions,
        name: &str,
        console: &mut dyn Console,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new(options, name);
        store.load(console)?;
        Ok(store)
    }

    /// Write an empty file (header and provenance row) unless one exists.
    pub fn create_if_missing(options: &StoreOptions, name: &str) -> Result<bool, StoreError> {
        if options.file_path(name).exists() {
            return Ok(false);
        }
        fs::create_dir_all(&options.data_dir)?;
        let mut store = Self::new(options.clone(), name);
        store.write("setup")?;
        info!(name, "created empty data file");
        Ok(true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_path(&self) -> PathBuf {
        self.options.file_path(&self.name)
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the in-memory collection with the file contents.
    ///
    /// The first data row is provenance. Malformed rows are shown to the
    /// operator, who either skips them or aborts the whole load. On abort
    /// the store is left as it was.
    pub fn load(&mut self, console: &mut dyn Console) -> Result<(), StoreError> {
        let path = self.file_path();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .flexible(true)
            .from_path(&path)?;
        let headers = reader.headers()?.clone();

        let mut rows = reader.records();
        let provenance = match rows.next() {
            Some(Ok(values)) => Provenance::from_row(&values).unwrap_or_default(),
            _ => Provenance::default(),
        };

        let mut next_id = provenance.issued;
        let mut entries: Vec<(RecordId, Entry<R>)> = Vec::new();
        let mut skipped = 0;

        for (idx, values) in rows.enumerate() {
            let row_number = idx + 2;
            let parsed = match values {
                Ok(values) => parse_row::<R>(&headers, &values, &entries)
                    .map_err(|err| (err, Some(values))),
                Err(err) => Err((RowError::from(err), None)),
            };
            match parsed {
                Ok((id, record)) => {
                    next_id = next_id.max(id);
                    entries.push((id, Entry::active(record)));
                }
                Err((err, raw)) => {
                    warn!(name = %self.name, row = row_number, error = %err, "malformed record");
                    let delimiter = char::from(self.options.delimiter);
                    let raw = raw.map(|values| {
                        values.iter().collect::<Vec<_>>().join(&delimiter.to_string())
                    });
                    let keep_going = continue_after_malformed(
                        console,
                        &headers,
                        row_number,
                        &err,
                        raw.as_deref(),
                    )?;
                    if !keep_going {
                        return Err(StoreError::Aborted {
                            name: self.name.clone(),
                            row: row_number,
                        });
                    }
                    skipped += 1;
                }
            }
        }

        info!(
            name = %self.name,
            records = entries.len(),
            skipped,
            next_id,
            "loaded data file"
        );
        self.entries = entries;
        self.next_id = next_id;
        self.provenance = provenance;
        self.dirty = false;
        self.set_page(1);
        Ok(())
    }

    /// Issue the next ID and append. The page cursor stays valid, so the
    /// first record of an empty store lands on page 1.
    pub fn add_record(&mut self, record: R) -> Result<RecordId, StoreError> {
        let Some(id) = self.next_id.checked_add(1) else {
            warn!(name = %self.name, next_id = self.next_id, "record IDs exhausted");
            return Err(StoreError::IdsExhausted(self.name.clone()));
        };
        self.next_id = id;
        self.entries.push((
            id,
            Entry {
                record,
                status: RecordStatus::New,
            },
        ));
        self.dirty = true;
        self.set_page(self.current_page.max(1));
        debug!(name = %self.name, id, "added record");
        Ok(id)
    }

    pub fn update_record(&mut self, id: RecordId, record: R) -> Result<(), StoreError> {
        let Some(entry) = self.entry_mut(id) else {
            warn!(id, "record to be updated not found");
            return Err(StoreError::NotFound(id));
        };
        entry.record = record;
        entry.status = RecordStatus::Updated;
        self.dirty = true;
        debug!(name = %self.name, id, "updated record");
        Ok(())
    }

    /// Mutate a record in place without touching its lifecycle tag.
    /// Used for statistics, which are not operator edits.
    pub fn modify_record(
        &mut self,
        id: RecordId,
        f: impl FnOnce(&mut R),
    ) -> Result<(), StoreError> {
        let entry = self.entry_mut(id).ok_or(StoreError::NotFound(id))?;
        f(&mut entry.record);
        self.dirty = true;
        Ok(())
    }

    /// Tag a record for deletion; it disappears on the next save.
    pub fn mark_deleted(&mut self, id: RecordId) -> Result<(), StoreError> {
        let entry = self.entry_mut(id).ok_or(StoreError::NotFound(id))?;
        entry.status = RecordStatus::Deleted;
        self.dirty = true;
        debug!(name = %self.name, id, "marked record for deletion");
        Ok(())
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.entries.iter().any(|(key, _)| *key == id)
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.entry(id).map(|entry| &entry.record)
    }

    pub fn entry(&self, id: RecordId) -> Option<&Entry<R>> {
        self.entries
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, entry)| entry)
    }

    fn entry_mut(&mut self, id: RecordId) -> Option<&mut Entry<R>> {
        self.entries
            .iter_mut()
            .find(|(key, _)| *key == id)
            .map(|(_, entry)| entry)
    }

    /// Records in collection order, including those tagged for deletion.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Entry<R>)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    /// First record, in insertion order, whose `name` column equals `value`.
    pub fn find_by_field(&self, name: &str, value: &str) -> Option<(RecordId, &R)> {
        self.find(|record| record.field(name).as_deref() == Some(value))
    }

    pub fn find(&self, mut predicate: impl FnMut(&R) -> bool) -> Option<(RecordId, &R)> {
        self.entries
            .iter()
            .find(|(_, entry)| predicate(&entry.record))
            .map(|(id, entry)| (*id, &entry.record))
    }

    pub fn save(&mut self, actor: &str, mode: SaveMode<'_>) -> Result<SaveOutcome, StoreError> {
        let console = match mode {
            SaveMode::Silent => {
                self.write(actor)?;
                return Ok(SaveOutcome::Saved);
            }
            SaveMode::Interactive(console) => console,
        };

        if !self.dirty {
            console.pause("There is nothing to save. Press enter to continue.")?;
            self.set_page(1);
            return Ok(SaveOutcome::NothingToSave);
        }

        loop {
            match console
                .ask_lower("Do you want to save changes? y/n or c to cancel:")?
                .as_str()
            {
                "y" => break,
                "n" => {
                    info!(name = %self.name, "discarding pending changes");
                    self.load(console)?;
                    return Ok(SaveOutcome::Discarded);
                }
                "c" => {
                    warn!(name = %self.name, "save cancelled");
                    return Ok(SaveOutcome::Cancelled);
                }
                _ => console.say(Tone::Input, "Please make up your mind! :)"),
            }
        }

        self.write(actor)?;
        console.pause("Data saved to file. Press enter to continue.")?;
        Ok(SaveOutcome::Saved)
    }

    /// Write to a temp file and rename it over the store file. In-memory state
    /// only changes once the rename has succeeded.
    fn write(&mut self, actor: &str) -> Result<(), StoreError> {
        let path = self.file_path();
        let tmp_path = path.with_extension("csv.tmp");
        let headers = schema::headers::<R>();
        let provenance = Provenance {
            issued: self.next_id,
            saved_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            saved_by: actor.to_string(),
        };

        let written = write_rows(
            &tmp_path,
            self.options.delimiter,
            &headers,
            &provenance,
            &self.entries,
        );
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        fs::rename(&tmp_path, &path)?;

        let before = self.entries.len();
        self.entries
            .retain(|(_, entry)| entry.status != RecordStatus::Deleted);
        for (_, entry) in &mut self.entries {
            entry.status = RecordStatus::Active;
        }
        info!(
            name = %self.name,
            records = self.entries.len(),
            purged = before - self.entries.len(),
            actor,
            "saved data file"
        );
        self.provenance = provenance;
        self.dirty = false;
        self.set_page(1);
        Ok(())
    }

    pub fn rows_per_page(&self) -> usize {
        self.options.rows_per_page.max(1)
    }

    pub fn total_pages(&self) -> usize {
        self.entries.len().div_ceil(self.rows_per_page())
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Clamp to `[1, total_pages]`, or 0 when there is nothing to show.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = if self.entries.is_empty() {
            0
        } else {
            page.clamp(1, self.total_pages())
        };
    }

    pub fn paginate(&mut self, step: isize) {
        let target = self.current_page.saturating_add_signed(step);
        self.set_page(target);
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.total_pages());
    }

    /// Index range of the current page within collection order.
    pub fn page_range(&self) -> std::ops::Range<usize> {
        if self.current_page == 0 {
            return 0..0;
        }
        let start = (self.current_page - 1) * self.rows_per_page();
        let end = (start + self.rows_per_page()).min(self.entries.len());
        start.min(end)..end
    }

    pub fn page(&self) -> &[(RecordId, Entry<R>)] {
        &self.entries[self.page_range()]
    }
}

fn parse_row<R: Record>(
    headers: &StringRecord,
    values: &StringRecord,
    seen: &[(RecordId, Entry<R>)],
) -> Result<(RecordId, R), RowError> {
    let row = Row::new(headers, values);
    let raw_id = row.get(ID_FIELD).unwrap_or("").trim();
    let id: RecordId = raw_id
        .parse()
        .map_err(|_| RowError::BadId(raw_id.to_string()))?;
    if id == 0 {
        return Err(RowError::ZeroId);
    }
    if seen.iter().any(|(key, _)| *key == id) {
        return Err(RowError::DuplicateId(id));
    }
    let record = R::from_row(&row)?;
    Ok((id, record))
}

fn write_rows<R: Record>(
    path: &Path,
    delimiter: u8,
    headers: &[&str],
    provenance: &Provenance,
    entries: &[(RecordId, Entry<R>)],
) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    writer.write_record(headers)?;
    writer.write_record(provenance.to_row(headers.len()))?;
    for (id, entry) in entries {
        if entry.status == RecordStatus::Deleted {
            continue;
        }
        let mut row = Vec::with_capacity(headers.len());
        row.push(id.to_string());
        row.extend(entry.record.to_row());
        writer.write_record(&row)?;
    }
    let file = writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))?;
    file.sync_all()?;
    Ok(())
}

fn continue_after_malformed(
    console: &mut dyn Console,
    headers: &StringRecord,
    row_number: usize,
    err: &RowError,
    raw: Option<&str>,
) -> io::Result<bool> {
    console.warn("There was an error reading this record:");
    console.say(Tone::Normal, &format!("Row {row_number}: {err}"));
    if let Some(raw) = raw {
        console.say(Tone::Normal, raw);
    }
    console.say(
        Tone::Normal,
        &format!("Expected columns: {}", headers.iter().collect::<Vec<_>>().join(", ")),
    );
    let answer = console
        .ask_lower("Do you want to continue reading this file or abort the program? c/a:")?;
    Ok(answer != "a")
}
