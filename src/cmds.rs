pub mod cache;
pub mod fetch;

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::api_defaults::CONFIG_PATH;
use crate::cache::ETagManager;
use crate::cli::CliArgs;
use crate::config::{Config, ConfigProperties};
use crate::error::{AddContext, CacheError};
use crate::store::FileStore;
use crate::Result;
use regex::Regex;

pub fn config_file(cli_args: &CliArgs) -> Result<PathBuf> {
    if let Some(config) = &cli_args.config {
        return Ok(PathBuf::from(config));
    }
    let home_dir = std::env::var("HOME").map_err(|_| {
        CacheError::ConfigurationError(
            "HOME is not set. Use --config to point to the config file".to_string(),
        )
    })?;
    Ok(Path::new(&home_dir).join(CONFIG_PATH))
}

pub fn read_config(config_file: &Path, domain: &str) -> Result<Config> {
    let f = File::open(config_file).err_context(format!(
        "Unable to open config file {}",
        config_file.to_string_lossy()
    ))?;
    Config::new(f, domain)
}

/// Host part of an http(s) url, without port. Selects the config section.
pub fn url_domain(url: &str) -> Result<String> {
    lazy_static! {
        static ref RE_HOST: Regex =
            Regex::new(r"^https?://(?:[^@/?#]*@)?(?P<host>[^:/?#@]+)").unwrap();
    }
    match RE_HOST.captures(url).and_then(|cap| cap.name("host")) {
        Some(host) => Ok(host.as_str().to_lowercase()),
        None => Err(CacheError::ConfigurationError(format!(
            "Cannot find a host in url {url}. Only http(s) urls are supported"
        ))
        .into()),
    }
}

/// Etag cache backed by the file store configured for the domain.
pub fn file_cache<C: ConfigProperties>(config: &C) -> Result<ETagManager<FileStore>> {
    let store = FileStore::new(config);
    store.validate_cache_location()?;
    Ok(ETagManager::new(store).with_header_name(config.etag_header_name()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::utils::ConfigMock;

    #[test]
    fn test_url_domain() {
        let test_table = vec![
            ("https://api.example.com/v1/offerings", "api.example.com"),
            ("http://localhost:8080/v1/offerings", "localhost"),
            ("https://API.Example.com", "api.example.com"),
            ("https://user@api.example.com:443/v1?x=1", "api.example.com"),
            ("https://api.example.com?x=1", "api.example.com"),
        ];
        for (url, expected) in test_table {
            assert_eq!(expected, url_domain(url).unwrap());
        }
    }

    #[test]
    fn test_url_domain_errors() {
        assert!(url_domain("ftp://api.example.com/a").is_err());
        assert!(url_domain("api.example.com/a").is_err());
        assert!(url_domain("https:///v1/a").is_err());
    }

    #[test]
    fn test_config_file_from_cli_args() {
        let cli_args = CliArgs::new(false, Some("/tmp/etag/api".to_string()));
        assert_eq!(PathBuf::from("/tmp/etag/api"), config_file(&cli_args).unwrap());
    }

    #[test]
    fn test_file_cache_uses_configured_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigMock::with_location(dir.path().to_str().unwrap())
            .with_etag_header("X-Api-ETag");
        let cache = file_cache(&config).unwrap();
        assert_eq!("x-api-etag", cache.header_name());
    }

    #[test]
    fn test_file_cache_default_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigMock::with_location(dir.path().to_str().unwrap());
        let cache = file_cache(&config).unwrap();
        assert_eq!(crate::api_defaults::ETAG_HEADER_NAME, cache.header_name());
    }

    #[test]
    fn test_read_config_missing_file_is_err() {
        assert!(read_config(Path::new("/path/does/not/exist"), "api.example.com").is_err());
    }
}
