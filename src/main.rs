use text_finder::cli::commands::{CliArgs, Commands};
use text_finder::cli::handlers::{handle_check_regexp, handle_config, handle_results, handle_scan};
use text_finder::util::logging::{config_from_env, init_logging, parse_level};
use text_finder::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("text-finder v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Scan(scan_args) => handle_scan(scan_args, args.quiet).await,
        Commands::CheckRegexp(check_args) => handle_check_regexp(check_args),
        Commands::Results => handle_results(),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = config_from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}
