use std::fs;
use std::path::PathBuf;

use etag::cache::{CachedResult, ETagManager, Resolution};
use etag::config::ConfigProperties;
use etag::error::CacheError;
use etag::http::{Headers, HttpResult};
use etag::io::HttpResponse;
use etag::store::{FileStore, Store};
use tempfile::TempDir;

struct TestConfig {
    cache_dir: PathBuf,
}

impl TestConfig {
    fn new(temp_dir: &TempDir) -> Self {
        TestConfig {
            cache_dir: temp_dir.path().to_path_buf(),
        }
    }
}

impl ConfigProperties for TestConfig {
    fn cache_location(&self) -> &str {
        self.cache_dir.to_str().unwrap()
    }
}

fn files_in(temp_dir: &TempDir) -> usize {
    fs::read_dir(temp_dir.path()).unwrap().count()
}

fn response(status: i32, body: &str, etag: &str) -> HttpResponse {
    let mut headers = Headers::new();
    headers.set("x-revenuecat-etag", etag);
    HttpResponse::builder()
        .status(status)
        .body(body.to_string())
        .headers(headers)
        .build()
        .unwrap()
}

#[test]
fn test_file_store_put_get() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(&TestConfig::new(&temp_dir));
    store.validate_cache_location().unwrap();

    store.put("/v1/offerings", "record").unwrap();

    let cache_file = store.get_cache_file("/v1/offerings");
    assert!(fs::metadata(&cache_file).is_ok());
    // no temporary files left behind
    assert_eq!(1, files_in(&temp_dir));
    assert_eq!(Some("record".to_string()), store.get("/v1/offerings").unwrap());
}

#[test]
fn test_file_store_missing_key() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(&TestConfig::new(&temp_dir));
    assert_eq!(None, store.get("/v1/offerings").unwrap());
}

#[test]
fn test_file_store_put_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(&TestConfig::new(&temp_dir));
    store.put("/v1/offerings", "first").unwrap();
    store.put("/v1/offerings", "second").unwrap();
    assert_eq!(Some("second".to_string()), store.get("/v1/offerings").unwrap());
    assert_eq!(1, files_in(&temp_dir));
}

#[test]
fn test_file_store_survives_new_instance() {
    let temp_dir = TempDir::new().unwrap();
    let config = TestConfig::new(&temp_dir);
    FileStore::new(&config).put("/v1/offerings", "record").unwrap();
    let store = FileStore::new(&config);
    assert_eq!(Some("record".to_string()), store.get("/v1/offerings").unwrap());
}

#[test]
fn test_file_store_clear_all() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(&TestConfig::new(&temp_dir));
    store.put("/v1/offerings", "a").unwrap();
    store.put("/v1/products", "b").unwrap();
    assert_eq!(2, files_in(&temp_dir));

    store.clear_all().unwrap();

    assert_eq!(0, files_in(&temp_dir));
    assert_eq!(None, store.get("/v1/offerings").unwrap());
    assert_eq!(0, store.size().unwrap());
}

#[test]
fn test_file_store_corrupt_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(&TestConfig::new(&temp_dir));
    fs::write(store.get_cache_file("/v1/offerings"), "not gzip data").unwrap();
    let err = store.get("/v1/offerings").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CacheError>(),
        Some(CacheError::CorruptRecord { .. })
    ));
}

#[test]
fn test_validate_cache_location_does_not_exist() {
    let temp_dir = TempDir::new().unwrap();
    let config = TestConfig {
        cache_dir: temp_dir.path().join("missing"),
    };
    let err = FileStore::new(&config)
        .validate_cache_location()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CacheError>(),
        Some(CacheError::CacheLocationDoesNotExist(_))
    ));
}

#[test]
fn test_validate_cache_location_is_not_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("file");
    fs::write(&file_path, "").unwrap();
    let config = TestConfig {
        cache_dir: file_path,
    };
    let err = FileStore::new(&config)
        .validate_cache_location()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CacheError>(),
        Some(CacheError::CacheLocationIsNotADirectory(_))
    ));
}

#[test]
fn test_etag_manager_over_file_store_serves_not_modified_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let config = TestConfig::new(&temp_dir);
    let path = "https://api.example.com/v1/offerings";

    let manager = ETagManager::new(FileStore::new(&config));
    let resolution = manager
        .resolve(path, false, &response(200, "body1", "v1"))
        .unwrap();
    assert_eq!(Resolution::Found(HttpResult::new(200, "body1")), resolution);

    let manager = ETagManager::new(FileStore::new(&config));
    let headers = manager.etag_header(path, false).unwrap();
    assert_eq!("v1", headers.get("x-revenuecat-etag").unwrap());
    let resolution = manager.resolve(path, false, &response(304, "", "v1")).unwrap();
    assert_eq!(Resolution::Found(HttpResult::new(200, "body1")), resolution);
    assert_eq!(
        Some(CachedResult::new("v1", HttpResult::new(200, "body1"))),
        manager.stored_record(path).unwrap()
    );

    manager.clear_all().unwrap();
    let resolution = manager.resolve(path, false, &response(304, "", "v1")).unwrap();
    assert_eq!(Resolution::Retry, resolution);
}

#[test]
fn test_file_store_concurrent_writers_on_same_location() {
    let temp_dir = TempDir::new().unwrap();
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let config = TestConfig::new(&temp_dir);
            std::thread::spawn(move || {
                let store = FileStore::new(&config);
                let value = format!("{i}").repeat(200 * 1024);
                for _ in 0..30 {
                    store.put("/v1/offerings", &value).unwrap();
                    let read = store.get("/v1/offerings").unwrap().unwrap();
                    assert_eq!(200 * 1024, read.len());
                    let first = read.chars().next().unwrap();
                    assert!(read.chars().all(|c| c == first));
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }
    assert_eq!(1, files_in(&temp_dir));
}

#[test]
fn test_file_store_failed_put_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(&TestConfig::new(&temp_dir));
    // a non empty directory where the record should go makes the rename fail
    let cache_file = store.get_cache_file("/v1/offerings");
    fs::create_dir(&cache_file).unwrap();
    fs::write(cache_file.join("blocker"), "x").unwrap();

    assert!(store.put("/v1/offerings", "record").is_err());
    assert_eq!(1, files_in(&temp_dir));
}
