//! Alertcast CLI entry point

use std::process::ExitCode;

use clap::Parser;

use alertcast::cli::{
    app::{init_logging, load_merged_config, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    run_command, run_detect, run_notify,
};
use alertcast::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Config { action } => {
            let presenter = Presenter::new();
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        // Merge: defaults < file < env
        Commands::Detect => run_detect(load_merged_config().await).await,
        Commands::Notify(args) => run_notify(load_merged_config().await, args).await,
        Commands::Run(args) => run_command(load_merged_config().await, args).await,
    }
}
