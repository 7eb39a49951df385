//! Config file parsing and validation.
//!
//! The config file holds `<domain>.<key>=<value>` lines. Only the lines for
//! the requested domain are kept. Recognized keys:
//!
//! - `cache_location`: directory of the file store (required)
//! - `etag_header`: name of the etag request/response header (optional)

use crate::api_defaults::ETAG_HEADER_NAME;
use crate::error::{self, CacheError};
use crate::Result;
use std::sync::Arc;
use std::{collections::HashMap, io::Read};

pub trait ConfigProperties {
    fn cache_location(&self) -> &str;
    fn etag_header_name(&self) -> &str {
        ETAG_HEADER_NAME
    }
}

#[derive(Clone, Debug, Default)]
pub struct Config {
    cache_location: String,
    etag_header_name: String,
}

impl Config {
    pub fn new<T: Read>(reader: T, domain: &str) -> Result<Self> {
        let config = Config::parse(reader, domain)?;
        let cache_location = config.get("cache_location").ok_or_else(|| {
            CacheError::ConfigurationError(format!(
                "No cache_location found for domain {domain} in config"
            ))
        })?;
        let etag_header_name = config
            .get("etag_header")
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(ETAG_HEADER_NAME);
        Ok(Config {
            cache_location: cache_location.trim().to_string(),
            etag_header_name: etag_header_name.to_string(),
        })
    }

    fn parse<T: Read>(mut reader: T, domain: &str) -> Result<HashMap<String, String>> {
        let mut config_data = String::new();
        reader.read_to_string(&mut config_data)?;
        let regex = regex::Regex::new(&format!(
            r"^{}\.(?P<key>\w+)=(?P<value>.*)",
            regex::escape(domain)
        ))?;
        let mut domain_config = HashMap::new();
        for line in config_data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // capture groups key and value from regex
            if let Some(captured_names) = regex.captures(line) {
                if let (Some(key), Some(value)) =
                    (captured_names.name("key"), captured_names.name("value"))
                {
                    domain_config.insert(key.as_str().to_string(), value.as_str().to_string());
                }
            }
        }
        if domain_config.is_empty() {
            return Err(error::gen(format!(
                "No config data found for domain {domain}"
            )));
        }
        Ok(domain_config)
    }
}

impl ConfigProperties for Config {
    fn cache_location(&self) -> &str {
        &self.cache_location
    }

    fn etag_header_name(&self) -> &str {
        &self.etag_header_name
    }
}

impl ConfigProperties for Arc<Config> {
    fn cache_location(&self) -> &str {
        self.as_ref().cache_location()
    }

    fn etag_header_name(&self) -> &str {
        self.as_ref().etag_header_name()
    }
}
