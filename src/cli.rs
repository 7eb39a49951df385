pub mod cache;

use clap::Parser;

use self::cache::{CacheCommand, CacheOptions};

#[derive(Parser)]
#[command(about = "HTTP response cache driven by ETag conditional requests")]
struct Args {
    #[clap(subcommand)]
    pub command: Command,
    /// Verbose mode. Logs cache decisions to stderr
    #[clap(long, short, global = true)]
    pub verbose: bool,
    /// Path to the config file. Defaults to $HOME/.config/etag/api
    #[clap(long, short, global = true, value_name = "FILE")]
    pub config: Option<String>,
}

#[derive(Parser)]
enum Command {
    #[clap(name = "get", about = "Fetch a url through the etag cache")]
    Get(UrlCommand),
    #[clap(name = "header", about = "Print the etag header the next request would send")]
    Header(UrlCommand),
    #[clap(name = "show", about = "Show the cached result for a url")]
    Show(ShowCommand),
    #[clap(name = "cache", about = "Local cache operations")]
    Cache(CacheCommand),
}

#[derive(Parser)]
struct UrlCommand {
    /// Url of the resource. Used as the cache key
    #[clap()]
    pub url: String,
    /// Refresh the cache. Sends an empty etag so the server returns the full
    /// payload
    #[clap(long, short)]
    pub refresh: bool,
}

#[derive(Parser)]
struct ShowCommand {
    /// Url of the resource
    #[clap()]
    pub url: String,
}

pub struct UrlOptions {
    pub url: String,
    pub refresh: bool,
}

impl From<UrlCommand> for UrlOptions {
    fn from(options: UrlCommand) -> Self {
        UrlOptions {
            url: options.url,
            refresh: options.refresh,
        }
    }
}

impl From<ShowCommand> for UrlOptions {
    fn from(options: ShowCommand) -> Self {
        UrlOptions {
            url: options.url,
            refresh: false,
        }
    }
}

pub enum CliOptions {
    Get(UrlOptions),
    Header(UrlOptions),
    Show(UrlOptions),
    Cache(CacheOptions),
}

/// Global arguments shared by every subcommand.
#[derive(Clone, Debug, Default)]
pub struct CliArgs {
    pub verbose: bool,
    pub config: Option<String>,
}

impl CliArgs {
    pub fn new(verbose: bool, config: Option<String>) -> Self {
        CliArgs { verbose, config }
    }
}

pub struct OptionArgs {
    pub cli_options: CliOptions,
    pub cli_args: CliArgs,
}

// Parse cli and return CliOptions
pub fn parse_cli() -> OptionArgs {
    let args = Args::parse();
    let cli_args = CliArgs::new(args.verbose, args.config);
    let cli_options = match args.command {
        Command::Get(sub_matches) => CliOptions::Get(sub_matches.into()),
        Command::Header(sub_matches) => CliOptions::Header(sub_matches.into()),
        Command::Show(sub_matches) => CliOptions::Show(sub_matches.into()),
        Command::Cache(sub_matches) => CliOptions::Cache(sub_matches.into()),
    };
    OptionArgs {
        cli_options,
        cli_args,
    }
}
