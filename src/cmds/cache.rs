use crate::cache::ETagManager;
use crate::cli::cache::CacheOptions;
use crate::cmds::{file_cache, read_config};
use crate::store::{FileStore, Store};
use crate::Result;
use std::fmt;
use std::io::Write;
use std::path::Path;

pub fn execute(options: CacheOptions, config_file: &Path) -> Result<()> {
    let config = read_config(config_file, options.domain())?;
    let cache = file_cache(&config)?;
    match options {
        CacheOptions::Info { .. } => info(cache.store(), std::io::stdout()),
        CacheOptions::Clear { .. } => clear(&cache, std::io::stdout()),
    }
}

fn info<W: Write>(store: &FileStore, mut writer: W) -> Result<()> {
    let size = store.size()?;
    writeln!(writer, "Location: {}", store.location().to_string_lossy())?;
    writeln!(writer, "Size: {}", BytesToHumanReadable::from(size))?;
    Ok(())
}

fn clear<S: Store, W: Write>(cache: &ETagManager<S>, mut writer: W) -> Result<()> {
    cache.clear_all()?;
    writeln!(writer, "Cache cleared")?;
    Ok(())
}

struct BytesToHumanReadable(u64);

impl From<u64> for BytesToHumanReadable {
    fn from(size: u64) -> Self {
        BytesToHumanReadable(size)
    }
}

impl fmt::Display for BytesToHumanReadable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let size = self.0;
        let suffixes = ["B", "KB", "MB", "GB"];
        let suffix_len = suffixes.len();
        let mut size = size as f64;
        let mut i = 0;
        while size >= 1024.0 && i < suffix_len - 1 {
            size /= 1024.0;
            i += 1;
        }
        write!(f, "{:.2} {}", size, suffixes[i])
    }
}
