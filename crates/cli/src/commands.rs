// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use console::style;
use lepkehalo_catalog::{book_url, MolyConfig};
use lepkehalo_config::{CatalogConfig, Config, ConfigManager, ConfigResult};
use lepkehalo_core::{AppError, Book, RecoveryAction};
use lepkehalo_library::{BookListStore, ScanEvent, ScanOrchestrator, ScanOutcome};
use std::io::Write;

/// Builds the Moly.hu client settings from the catalog section
pub fn moly_config(catalog: &CatalogConfig) -> MolyConfig {
    MolyConfig::default()
        .with_api_base(&catalog.api_base)
        .with_book_url_base(&catalog.book_url_base)
        .with_api_key(&catalog.api_key)
        .with_timeout(catalog.timeout())
}

/// List the books, most recent first
pub fn list_books(store: &BookListStore, out: &mut impl Write) -> Result<()> {
    let books = store.books();

    if books.is_empty() {
        writeln!(out, "No books yet. Use 'scan' to add one.")?;
        return Ok(());
    }

    writeln!(out, "\n{} Books", style(books.len()).bold().cyan())?;
    writeln!(out, "{}", "=".repeat(80))?;

    for (index, book) in books.iter().enumerate() {
        print_book_summary(index, book, out)?;
    }

    Ok(())
}

/// Feed one scan through the orchestrator
pub async fn scan(
    orchestrator: &ScanOrchestrator,
    event: &ScanEvent,
    out: &mut impl Write,
) -> Result<()> {
    let outcome = orchestrator.handle_scan(event).await;

    match outcome {
        ScanOutcome::Added(ref book) => {
            writeln!(out, "{} Added '{}'", style("✓").green().bold(), book.title)?;
            writeln!(out, "  by {}", book.author)?;
        }
        ScanOutcome::MovedToTop(ref book) => {
            writeln!(out, "{} Moved '{}' to the top", style("✓").green().bold(), book.title)?;
        }
        ScanOutcome::Ignored => {
            writeln!(out, "Nothing was scanned.")?;
        }
        ScanOutcome::NotFound { .. } | ScanOutcome::Unavailable { .. } => {
            let message = outcome.user_message().unwrap_or("Scan failed");
            writeln!(out, "{} {}", style("✗").red().bold(), message)?;
            bail!("{}", message);
        }
    }

    Ok(())
}

/// Remove a book, optionally putting it straight back
pub fn remove_book(store: &BookListStore, id: &str, undo: bool, out: &mut impl Write) -> Result<()> {
    let removed = store.remove_book(id).ok_or_else(|| AppError::BookNotFound {
        id: id.to_string(),
    })?;

    writeln!(
        out,
        "{} Removed '{}' (was #{})",
        style("✓").green().bold(),
        removed.book.title,
        removed.index + 1
    )?;

    if undo {
        let title = removed.book.title.clone();
        store.restore_book(removed.book, removed.index);
        writeln!(out, "{} Restored '{}' at #{}", style("↺").yellow().bold(), title, removed.index + 1)?;
    }

    Ok(())
}

/// Move a book to the top of the list
pub fn move_to_top(store: &BookListStore, id: &str, out: &mut impl Write) -> Result<()> {
    let book = store.require(id).map_err(AppError::from)?;
    store.move_to_top(id);
    writeln!(out, "{} Moved '{}' to the top", style("✓").green().bold(), book.title)?;
    Ok(())
}

/// Print the Moly.hu page of a book
pub fn print_url(book_url_base: &str, id: &str, out: &mut impl Write) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Book ID must not be empty");
    }
    writeln!(out, "{}", book_url(book_url_base, id))?;
    Ok(())
}

/// Use the loaded settings, or the defaults if the file is merely unusable
///
/// Errors that defaults cannot fix, such as an unreadable config directory,
/// are returned.
pub fn config_or_defaults(loaded: ConfigResult<Config>, out: &mut impl Write) -> Result<Config> {
    let err = match loaded {
        Ok(config) => return Ok(config),
        Err(e) => AppError::from(e),
    };

    if err.recovery_action() != RecoveryAction::UseDefaults {
        return Err(err.into());
    }

    writeln!(out, "{} {}", style("Warning:").yellow().bold(), err.user_message())?;
    writeln!(out, "  {}", style(&err).dim())?;
    Ok(Config::default())
}

/// Write a default config file unless one exists
pub fn init_config(manager: &ConfigManager, out: &mut impl Write) -> Result<()> {
    let created = manager.initialize().map_err(AppError::from)?;
    let path = manager.config_path().display();

    if created {
        writeln!(out, "{} Wrote default settings to {}", style("✓").green().bold(), path)?;
    } else {
        writeln!(out, "Settings already exist at {}", path)?;
    }
    Ok(())
}

/// Print a failed command's error for the user
pub fn report_error(err: &anyhow::Error, out: &mut impl Write) {
    let result = match err.downcast_ref::<AppError>() {
        Some(app) => {
            if app.is_critical() {
                log::error!("{}", app);
            }
            writeln!(out, "{} {}", style("Error:").red().bold(), app.user_message())
                .and_then(|()| writeln!(out, "  {}", style(app).dim()))
        }
        None => writeln!(out, "{} {:#}", style("Error:").red().bold(), err),
    };

    if let Err(e) = result {
        log::error!("Could not print error: {}", e);
    }
}

/// Print the effective configuration as TOML
pub fn show_config(config: &Config, out: &mut impl Write) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    write!(out, "{}", text)?;
    Ok(())
}

fn print_book_summary(index: usize, book: &Book, out: &mut impl Write) -> Result<()> {
    writeln!(out, "\n{:>3}. {}", index + 1, style(truncate(&book.title, 70)).bold())?;
    writeln!(out, "     by {}", book.author)?;
    write!(out, "     ID: {}", book.id)?;
    if let Some(ref isbn) = book.isbn {
        write!(out, " | ISBN: {}", isbn)?;
    }
    writeln!(out)?;
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
