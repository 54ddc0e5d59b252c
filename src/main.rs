use clap::Parser;
use color_eyre::Result;
use std::io;
use std::path::Path;
use tracing::info;

use mediatrack::cli::{self, Cli, Commands, NewEntry};
use mediatrack::{Config, Database, EntriesContainer, Profile, logging};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // --config replaces the profile's config file
    let config = match &cli.config {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load_with_profile(profile)?,
    };

    let _log_guard = logging::init(&config.get_log_path(), &config.log_level)?;
    info!(?profile, database = %config.get_database_path().display(), "starting");

    let db = Database::new(config.get_database_path())?;
    let mut entries = EntriesContainer::open(db)?;
    let mut out = io::stdout();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => mediatrack::tui::run(config, entries)?,
        Commands::AddType { name, image_query } => {
            cli::handle_add_type(name, image_query, &mut entries, &mut out)?;
        }
        Commands::SetImageQuery {
            entry_type,
            image_query,
        } => {
            cli::handle_set_image_query(&entry_type, &image_query, &mut entries, &mut out)?;
        }
        Commands::AddEntry {
            entry_type,
            title,
            status,
            total,
            link,
            media_type,
            tags,
        } => {
            let fields = NewEntry {
                status,
                total,
                link,
                media_type,
                tags,
            };
            cli::handle_add_entry(&entry_type, title, fields, &mut entries, &mut out)?;
        }
        Commands::List { entry_type } => {
            cli::handle_list(entry_type.as_deref(), &entries, &mut out)?;
        }
    }

    Ok(())
}
