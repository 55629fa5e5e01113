use anyhow::{anyhow, Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// CsvConnection owns the data directory and serializes writes to it.
///
/// Opening a connection creates the directory if needed; dropping the last
/// clone releases it. There is no process-wide store.
#[derive(Clone, Debug)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn doctors_file_path(&self) -> PathBuf {
        self.base_directory.join("doctors.yaml")
    }

    pub fn visits_file_path(&self) -> PathBuf {
        self.base_directory.join("visits.csv")
    }

    pub fn expenses_file_path(&self) -> PathBuf {
        self.base_directory.join("expenses.csv")
    }

    pub fn salaries_file_path(&self) -> PathBuf {
        self.base_directory.join("salaries.csv")
    }

    /// Hold this guard across any read-modify-write of a data file
    pub fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow!("Data directory lock poisoned"))
    }

    /// Ensure a CSV file exists, creating it with the given header row.
    ///
    /// Safe to call without the lock: the file is only ever created, never
    /// replaced, so a concurrent writer's contents are left alone.
    pub fn ensure_csv_file(&self, path: &Path, header: &[&str]) -> Result<()> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()))
            }
        };

        let mut writer = ::csv::Writer::from_writer(Vec::new());
        writer.write_record(header)?;
        let contents = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to build CSV header: {}", e))?;
        file.write_all(&contents)
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
        debug!("Created {}", path.display());
        Ok(())
    }

    /// Replace a file's contents via a temp file and rename
    pub fn write_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        write_atomically(path, contents)
    }
}

/// Replace `path` with `contents`.
///
/// The bytes go to a uniquely named temp file in the same directory, which is
/// then renamed over `path`, so readers see either the old or the new file and
/// concurrent writers never share a temp file.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(directory)
        .with_context(|| format!("Failed to create temp file in {}", directory.display()))?;
    temp_file
        .write_all(contents)
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    temp_file
        .persist(path)
        .map_err(|e| anyhow!("Failed to replace {}: {}", path.display(), e.error))?;
    Ok(())
}

/// Rows read from a data file.
///
/// Rows that cannot be parsed are kept verbatim in `unparsed` so a later
/// rewrite of the file puts them back unchanged instead of dropping them.
#[derive(Debug)]
pub struct LoadedRows<T> {
    pub rows: Vec<T>,
    pub unparsed: Vec<::csv::StringRecord>,
}

impl<T> LoadedRows<T> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            unparsed: Vec::new(),
        }
    }

    /// Remove unparsed rows whose id column is `id`, returning how many went
    pub fn discard_unparsed(&mut self, id: &str) -> usize {
        let before = self.unparsed.len();
        self.unparsed.retain(|record| record.get(0) != Some(id));
        before - self.unparsed.len()
    }
}

impl<T> Default for LoadedRows<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// CSV writer for rewriting a data file; flexible so preserved rows keep
/// whatever field count they had
pub fn data_file_writer() -> ::csv::Writer<Vec<u8>> {
    ::csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new())
}
