use clap::Parser;

#[derive(Parser)]
pub struct CacheCommand {
    /// Domain whose cache to operate on, as found in the config file
    #[clap()]
    domain: String,
    #[clap(subcommand)]
    subcommand: CacheSubcommand,
}

#[derive(Parser)]
enum CacheSubcommand {
    #[clap(name = "info", about = "Get local cache size and location")]
    Info,
    #[clap(name = "clear", about = "Remove every cached result")]
    Clear,
}

pub enum CacheOptions {
    Info { domain: String },
    Clear { domain: String },
}

impl CacheOptions {
    pub fn domain(&self) -> &str {
        match self {
            CacheOptions::Info { domain } | CacheOptions::Clear { domain } => domain,
        }
    }
}

impl From<CacheCommand> for CacheOptions {
    fn from(options: CacheCommand) -> Self {
        match options.subcommand {
            CacheSubcommand::Info => CacheOptions::Info {
                domain: options.domain,
            },
            CacheSubcommand::Clear => CacheOptions::Clear {
                domain: options.domain,
            },
        }
    }
}
