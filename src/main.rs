use env_logger::Env;
use etag::{
    cli::{parse_cli, CliOptions},
    cmds::{self, cache, fetch},
    Result,
};

fn main() -> Result<()> {
    let option_args = parse_cli();
    let cli_args = option_args.cli_args;
    if cli_args.verbose {
        let env = Env::default().default_filter_or("info");
        env_logger::init_from_env(env);
    }
    let config_file = cmds::config_file(&cli_args)?;
    match option_args.cli_options {
        CliOptions::Get(options) => fetch::execute_get(options, &config_file),
        CliOptions::Header(options) => fetch::execute_header(options, &config_file),
        CliOptions::Show(options) => fetch::execute_show(options, &config_file),
        CliOptions::Cache(options) => cache::execute(options, &config_file),
    }
}
