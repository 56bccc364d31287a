//! Append-mode Darwin Core CSV writer
//!
//! All rows go through one channel into a single blocking writer task, so
//! rows from concurrent workers never interleave and the header is always
//! the first row of a fresh file.

use super::{SinkOptions, SinkStats};
use crate::domain::{schema, HarvesterError, NormalizedRecord, Result};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 1024;
const FLUSH_EVERY: u64 = 100;

enum SinkCommand {
    Header,
    Record(Box<NormalizedRecord>),
    Close,
}

/// Cloneable write handle given to each worker
#[derive(Clone)]
pub struct SinkHandle {
    tx: mpsc::Sender<SinkCommand>,
}

impl SinkHandle {
    async fn send(&self, command: SinkCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| HarvesterError::Sink("CSV writer is no longer running".to_string()))
    }

    /// Queues the header row. A no-op when the file already has one.
    pub async fn write_header(&self) -> Result<()> {
        self.send(SinkCommand::Header).await
    }

    /// Queues one data row.
    pub async fn write(&self, record: NormalizedRecord) -> Result<()> {
        self.send(SinkCommand::Record(Box::new(record))).await
    }
}

/// Owner of the output file
pub struct CsvSink {
    path: PathBuf,
    handle: SinkHandle,
    writer: JoinHandle<Result<SinkStats>>,
}

impl CsvSink {
    /// Opens `path` for appending and starts the writer task.
    ///
    /// The parent directory is created if missing. A non-empty existing file
    /// is assumed to start with a header already.
    pub fn open(path: impl AsRef<Path>, options: SinkOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                HarvesterError::Sink(format!(
                    "Failed to create output directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                HarvesterError::Sink(format!("Failed to open {}: {e}", path.display()))
            })?;
        let has_header = file.metadata().map(|m| m.len() > 0)?;

        tracing::info!(
            path = %path.display(),
            appending = has_header,
            unique_key_terms = ?options.unique_key_terms,
            "Opened CSV output"
        );

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let state = WriterState::new(file, has_header, options);
        let writer = tokio::task::spawn_blocking(move || state.run(rx));

        Ok(Self {
            path,
            handle: SinkHandle { tx },
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> SinkHandle {
        self.handle.clone()
    }

    /// Flushes and releases the file.
    ///
    /// Rows queued through any handle before this call are written first.
    pub async fn close(self) -> Result<SinkStats> {
        // The writer may already have stopped on an error; its result says why.
        let _ = self.handle.send(SinkCommand::Close).await;
        drop(self.handle);
        let stats = self
            .writer
            .await
            .map_err(|e| HarvesterError::Sink(format!("CSV writer task failed: {e}")))??;
        tracing::info!(
            path = %self.path.display(),
            rows_written = stats.rows_written,
            duplicates_skipped = stats.duplicates_skipped,
            "Closed CSV output"
        );
        Ok(stats)
    }
}

struct WriterState {
    writer: csv::Writer<File>,
    has_header: bool,
    key_terms: Vec<String>,
    seen: HashSet<String>,
    stats: SinkStats,
}

impl WriterState {
    fn new(file: File, has_header: bool, options: SinkOptions) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .escape(b'\\')
            .double_quote(false)
            .has_headers(false)
            .from_writer(file);
        Self {
            writer,
            has_header,
            key_terms: options.unique_key_terms,
            seen: HashSet::new(),
            stats: SinkStats::default(),
        }
    }

    fn run(mut self, mut rx: mpsc::Receiver<SinkCommand>) -> Result<SinkStats> {
        while let Some(command) = rx.blocking_recv() {
            match command {
                SinkCommand::Header => self.ensure_header()?,
                SinkCommand::Record(record) => self.write_record(&record)?,
                SinkCommand::Close => break,
            }
        }
        rx.close();
        self.writer.flush()?;
        Ok(self.stats)
    }

    fn ensure_header(&mut self) -> Result<()> {
        if self.has_header {
            return Ok(());
        }
        self.writer.write_record(schema::header())?;
        self.writer.flush()?;
        self.has_header = true;
        self.stats.header_written = true;
        Ok(())
    }

    fn write_record(&mut self, record: &NormalizedRecord) -> Result<()> {
        self.ensure_header()?;

        if !self.key_terms.is_empty() && !self.seen.insert(record.key(&self.key_terms)) {
            self.stats.duplicates_skipped += 1;
            tracing::debug!(key = %record.key(&self.key_terms), "Skipping duplicate record");
            return Ok(());
        }

        let fields: Vec<Cow<'_, str>> =
            record.values().iter().map(|v| escape_escapes(v)).collect();
        self.writer.write_record(fields.iter().map(|f| f.as_bytes()))?;
        self.stats.rows_written += 1;
        if self.stats.rows_written % FLUSH_EVERY == 0 {
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Doubles every backslash. The writer only escapes quote characters, so a
/// literal escape character must be escaped before the row is written.
fn escape_escapes(value: &str) -> Cow<'_, str> {
    if value.contains('\\') {
        Cow::Owned(value.replace('\\', "\\\\"))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, remarks: &str) -> NormalizedRecord {
        let mut record = NormalizedRecord::new();
        record.set(schema::OCCURRENCE_ID, id);
        record.set(schema::OCCURRENCE_REMARKS, remarks);
        record
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_header_precedes_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::open(&path, SinkOptions::default()).unwrap();
        let handle = sink.handle();
        handle.write_header().await.unwrap();
        handle.write(record("a", "one")).await.unwrap();
        let stats = sink.close().await.unwrap();

        assert_eq!(stats.rows_written, 1);
        assert!(stats.header_written);
        let lines = lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], schema::header().join(","));
    }

    #[tokio::test]
    async fn test_header_written_lazily_before_first_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::open(&path, SinkOptions::default()).unwrap();
        sink.handle().write(record("a", "one")).await.unwrap();
        sink.close().await.unwrap();
        assert!(lines(&path)[0].starts_with("basisOfRecord,"));
    }

    #[tokio::test]
    async fn test_quotes_are_backslash_escaped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::open(&path, SinkOptions::default()).unwrap();
        sink.handle()
            .write(record("a", r#"said "meow", twice"#))
            .await
            .unwrap();
        sink.close().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains(r#""said \"meow\", twice""#));
    }

    #[tokio::test]
    async fn test_backslashes_survive_a_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::open(&path, SinkOptions::default()).unwrap();
        let handle = sink.handle();
        handle
            .write(record("a", r"path C:\photos\, see dir\"))
            .await
            .unwrap();
        handle.write(record("b", "")).await.unwrap();
        handle.write(record("c", r"C:\dir")).await.unwrap();
        handle
            .write(record("d", r#"a \"quoted\" \\ mess"#))
            .await
            .unwrap();
        sink.close().await.unwrap();

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .escape(Some(b'\\'))
            .double_quote(false)
            .from_path(&path)
            .unwrap();
        let rows: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        let remarks = schema::position(schema::OCCURRENCE_REMARKS).unwrap();

        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == schema::FIELD_COUNT));
        assert_eq!(&rows[0][remarks], r"path C:\photos\, see dir\");
        assert_eq!(&rows[1][remarks], "");
        assert_eq!(&rows[2][remarks], r"C:\dir");
        assert_eq!(&rows[3][remarks], r#"a \"quoted\" \\ mess"#);
    }

    #[test]
    fn test_escape_escapes() {
        assert_eq!(escape_escapes("plain"), Cow::Borrowed("plain"));
        assert_eq!(escape_escapes(r"a\b"), r"a\\b");
    }

    #[tokio::test]
    async fn test_duplicates_skipped_with_key_terms() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let options = SinkOptions {
            unique_key_terms: vec![schema::OCCURRENCE_ID.to_string()],
        };
        let sink = CsvSink::open(&path, options).unwrap();
        let handle = sink.handle();
        handle.write(record("a", "one")).await.unwrap();
        handle.write(record("a", "two")).await.unwrap();
        handle.write(record("b", "three")).await.unwrap();
        let stats = sink.close().await.unwrap();

        assert_eq!(stats.rows_written, 2);
        assert_eq!(stats.duplicates_skipped, 1);
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.csv");
        let sink = CsvSink::open(&path, SinkOptions::default()).unwrap();
        assert_eq!(sink.path(), path.as_path());
        sink.close().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::open(dir.path().join("out.csv"), SinkOptions::default()).unwrap();
        let handle = sink.handle();
        sink.close().await.unwrap();
        assert!(handle.write(record("a", "one")).await.is_err());
    }
}
