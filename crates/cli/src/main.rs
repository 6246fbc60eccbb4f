// FILE: crates/cli/src/main.rs

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lepkehalo_catalog::MolyClient;
use lepkehalo_config::{apply_env_overrides, Config, ConfigManager, LogLevel};
use lepkehalo_core::AppError;
use lepkehalo_library::{BookListStore, ScanEvent, ScanOrchestrator};
use lepkehalo_storage::{FileStore, KeyValueStore};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod commands;

fn build_cli() -> Command {
    Command::new("lepkehalo")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Lepkehalo Contributors")
        .about("Keeps the list of books you scanned, looked up on Moly.hu")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory the book list is stored in")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("DIR")
                .help("Directory containing config.toml")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(Command::new("list").about("List scanned books, most recent first"))
        .subcommand(
            Command::new("scan")
                .about("Handle a scanned barcode")
                .arg(Arg::new("isbn").required(true).value_name("ISBN").help("Scanned ISBN"))
                .arg(
                    Arg::new("symbology")
                        .short('s')
                        .long("symbology")
                        .value_name("TYPE")
                        .help("Barcode type reported by the scanner")
                        .default_value("EAN_13"),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a book from the list")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Moly.hu book ID"))
                .arg(
                    Arg::new("undo")
                        .short('u')
                        .long("undo")
                        .help("Put the book back right away")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("top")
                .about("Move a book to the top of the list")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Moly.hu book ID")),
        )
        .subcommand(
            Command::new("url")
                .about("Print the Moly.hu page of a book")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Moly.hu book ID")),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration")
                .arg(
                    Arg::new("init")
                        .long("init")
                        .help("Write a default config file if there is none")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn init_logging(level: LogLevel) {
    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.to_string()))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<(ConfigManager, Config)> {
    let manager = match matches.get_one::<PathBuf>("config") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new().map_err(AppError::from)?,
    };

    let mut config = commands::config_or_defaults(manager.load(), &mut std::io::stderr().lock())?;
    apply_env_overrides(&mut config);

    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config.storage.data_dir = Some(dir.clone());
    }

    Ok((manager, config))
}

async fn open_store(manager: &ConfigManager, config: &Config) -> Result<BookListStore> {
    let data_dir = manager.data_dir(config);
    log::debug!("Using data directory {}", data_dir.display());

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(data_dir));
    let store = BookListStore::with_key(storage, config.storage.books_key.clone())
        .map_err(AppError::from)?;
    store.load_books().await;
    Ok(store)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("<{}> is required", name))
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report_error(&err, &mut std::io::stderr().lock());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    let (manager, config) = load_config(&matches)?;
    init_logging(config.app.log_level);
    log::debug!("Config directory: {}", manager.config_dir().display());

    let mut out = std::io::stdout().lock();

    match matches.subcommand() {
        Some(("config", sub_matches)) if sub_matches.get_flag("init") => {
            commands::init_config(&manager, &mut out)
        }
        Some(("config", _)) => commands::show_config(&config, &mut out),
        Some(("url", sub_matches)) => {
            commands::print_url(&config.catalog.book_url_base, required(sub_matches, "id")?, &mut out)
        }
        Some((name, sub_matches)) => {
            let store = open_store(&manager, &config).await?;

            let result = match name {
                "list" => commands::list_books(&store, &mut out),
                "scan" => {
                    let catalog = MolyClient::with_config(commands::moly_config(&config.catalog))
                        .map_err(AppError::from)?;
                    let orchestrator = ScanOrchestrator::new(store.clone(), Arc::new(catalog));
                    let event = ScanEvent::new(
                        required(sub_matches, "symbology")?,
                        required(sub_matches, "isbn")?,
                    );
                    commands::scan(&orchestrator, &event, &mut out).await
                }
                "remove" => commands::remove_book(
                    &store,
                    required(sub_matches, "id")?,
                    sub_matches.get_flag("undo"),
                    &mut out,
                ),
                "top" => commands::move_to_top(&store, required(sub_matches, "id")?, &mut out),
                other => Err(anyhow::anyhow!("Unknown command: {}", other)),
            };

            store.flush().await;
            result
        }
        None => {
            build_cli().print_help()?;
            writeln!(out)?;
            Ok(())
        }
    }
}
