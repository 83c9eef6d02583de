use clap::Parser;
use proceeds::args::{Args, ColumnSubcommand, Command, RowSubcommand};
use proceeds::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().proceeds_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::New(new_args) => {
            commands::new_project(Config::load(home).await?, new_args.clone())
                .await?
                .print()
        }

        Command::Show(show_args) => commands::show(Config::load(home).await?, show_args.clone())
            .await?
            .print(),

        Command::Set(set_args) => commands::set(Config::load(home).await?, set_args.clone())
            .await?
            .print(),

        Command::Row(row_args) => {
            let config = Config::load(home).await?;
            match row_args.command() {
                RowSubcommand::Add(add_args) => {
                    commands::row_add(config, add_args.clone()).await?.print()
                }
                RowSubcommand::Delete(delete_args) => commands::row_delete(config, delete_args.clone())
                    .await?
                    .print(),
            }
        }

        Command::Column(column_args) => {
            let config = Config::load(home).await?;
            match column_args.command() {
                ColumnSubcommand::Add(add_args) => commands::column_add(config, add_args.clone())
                    .await?
                    .print(),
                ColumnSubcommand::Delete(delete_args) => {
                    commands::column_delete(config, delete_args.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Export(export_args) => {
            commands::export(Config::load(home).await?, export_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
