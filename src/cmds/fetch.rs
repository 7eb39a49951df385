use std::io::Write;
use std::path::Path;

use crate::cache::ETagManager;
use crate::cli::UrlOptions;
use crate::cmds::{file_cache, read_config, url_domain};
use crate::error;
use crate::http::{status, Client, ETagClient};
use crate::io::{HttpResponse, HttpRunner};
use crate::store::{FileStore, Store};
use crate::Result;

pub fn execute_get(options: UrlOptions, config_file: &Path) -> Result<()> {
    let cache = domain_cache(&options.url, config_file)?;
    let client = ETagClient::new(Client::new(), cache);
    get(&client, &options, std::io::stdout())
}

pub fn execute_header(options: UrlOptions, config_file: &Path) -> Result<()> {
    let cache = domain_cache(&options.url, config_file)?;
    header(&cache, &options, std::io::stdout())
}

pub fn execute_show(options: UrlOptions, config_file: &Path) -> Result<()> {
    let cache = domain_cache(&options.url, config_file)?;
    show(&cache, &options, std::io::stdout())
}

fn domain_cache(url: &str, config_file: &Path) -> Result<ETagManager<FileStore>> {
    let domain = url_domain(url)?;
    let config = read_config(config_file, &domain)?;
    file_cache(&config)
}

fn get<R: HttpRunner<Response = HttpResponse>, S: Store, W: Write>(
    client: &ETagClient<R, S>,
    options: &UrlOptions,
    mut writer: W,
) -> Result<()> {
    let result = client.get(&options.url, options.refresh)?;
    writeln!(writer, "{}", result.body)?;
    if result.status_code >= status::ERROR {
        return Err(error::gen(format!(
            "Request to {} failed with status {}",
            options.url, result.status_code
        )));
    }
    Ok(())
}

fn header<S: Store, W: Write>(
    cache: &ETagManager<S>,
    options: &UrlOptions,
    mut writer: W,
) -> Result<()> {
    let headers = cache.etag_header(&options.url, options.refresh)?;
    for (name, value) in headers.iter() {
        writeln!(writer, "{name}: {value}")?;
    }
    Ok(())
}

fn show<S: Store, W: Write>(
    cache: &ETagManager<S>,
    options: &UrlOptions,
    mut writer: W,
) -> Result<()> {
    match cache.stored_record(&options.url)? {
        Some(record) => {
            writeln!(writer, "Status: {}", record.result.status_code)?;
            writeln!(writer, "ETag: {}", record.etag)?;
            writeln!(writer)?;
            writeln!(writer, "{}", record.result.body)?;
        }
        None => writeln!(writer, "{} is not cached", options.url)?,
    }
    Ok(())
}
