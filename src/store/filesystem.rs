use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::api_defaults::WRITE_TEST_FILE;
use crate::config::ConfigProperties;
use crate::error::{AddContext, CacheError};
use crate::store::Store;
use crate::{log_debug, Result};

/// One gzip compressed file per key inside the configured cache location.
/// File names are the SHA-256 of the key so any path is a valid key.
pub struct FileStore {
    location: PathBuf,
}

impl FileStore {
    pub fn new<C: ConfigProperties + ?Sized>(config: &C) -> Self {
        FileStore {
            location: PathBuf::from(config.cache_location()),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn validate_cache_location(&self) -> Result<()> {
        let path = self.location.as_path();
        let cache_location = path.to_string_lossy();

        if !path.exists() {
            return Err(CacheError::CacheLocationDoesNotExist(format!(
                "Cache directory does not exist: {cache_location}"
            ))
            .into());
        }

        if !path.is_dir() {
            return Err(CacheError::CacheLocationIsNotADirectory(format!(
                "Cache location is not a directory: {cache_location}"
            ))
            .into());
        }

        // Check if we can write to the directory
        let test_file_path = path.join(WRITE_TEST_FILE);
        match File::create(&test_file_path) {
            Ok(_) => {
                if let Err(e) = fs::remove_file(&test_file_path) {
                    return Err(CacheError::CacheLocationIsNotWriteable(format!(
                        "Failed to remove cache test file {}: {}",
                        test_file_path.to_string_lossy(),
                        e
                    ))
                    .into());
                }
            }
            Err(e) => {
                return Err(CacheError::CacheLocationIsNotWriteable(format!(
                    "No write permission for cache directory {cache_location}: {e}"
                ))
                .into());
            }
        }
        Ok(())
    }

    pub fn get_cache_file(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key);
        let hash = hasher.finalize();
        self.location.join(format!("{hash:x}"))
    }

    /// Total size in bytes of the files in the cache location.
    pub fn size(&self) -> Result<u64> {
        let mut size = 0;
        for entry in fs::read_dir(&self.location)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                size += metadata.len();
            }
        }
        Ok(size)
    }

    fn read_record(&self, reader: impl Read) -> Result<String> {
        let mut decoder = GzDecoder::new(BufReader::new(reader));
        let mut data = String::new();
        decoder.read_to_string(&mut data)?;
        Ok(data)
    }

    fn write_record<W: Write>(&self, value: &str, f: BufWriter<W>) -> Result<()> {
        let mut encoder = GzEncoder::new(f, Compression::default());
        encoder.write_all(value.as_bytes())?;
        let mut f = encoder.finish()?;
        f.flush()?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.get_cache_file(key);
        match File::open(&path) {
            Ok(f) => {
                let data = self.read_record(f).map_err(|err| CacheError::CorruptRecord {
                    key: key.to_string(),
                    reason: err.to_string(),
                })?;
                Ok(Some(data))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).err_context(format!(
                "Cannot open cache file {}",
                path.to_string_lossy()
            )),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.get_cache_file(key);
        // Each writer gets its own temp file in the cache location and renames
        // it into place, so readers never see a partial record. The temp file
        // is removed on drop if anything fails before the rename.
        let mut tmp = NamedTempFile::new_in(&self.location).err_context(format!(
            "Cannot create temporary cache file in {}",
            self.location.to_string_lossy()
        ))?;
        self.write_record(value, BufWriter::new(&mut tmp))?;
        tmp.persist(&path).err_context(format!(
            "Cannot move cache file into place {}",
            path.to_string_lossy()
        ))?;
        log_debug!("Stored {} in {}", key, path.to_string_lossy());
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        for entry in fs::read_dir(&self.location).err_context(format!(
            "Cannot read cache directory {}",
            self.location.to_string_lossy()
        ))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}
