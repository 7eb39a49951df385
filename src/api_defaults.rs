// Request and response header carrying the validator. Servers that do not
// take part in the protocol for a resource simply omit it in the response.
pub const ETAG_HEADER_NAME: &str = "x-revenuecat-etag";

// Config file location relative to $HOME
pub const CONFIG_PATH: &str = ".config/etag/api";

// Name of the probe file used to verify the cache directory is writeable.
pub const WRITE_TEST_FILE: &str = ".write_test_cache_file";
