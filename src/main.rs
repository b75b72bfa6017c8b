mod config;
mod contact;
mod mirror;
mod pagination;
mod search;
mod store;
mod ui;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use store::PhoneBook;

#[derive(Parser, Debug)]
#[command(name = "rolo", about = "Terminal address book")]
struct Cli {
    /// Initialize the file structure (required before the first run)
    #[arg(long, default_value_t = false)]
    init: bool,

    /// Bulk-load contacts from a .csv or .json file
    #[arg(long, value_name = "PATH")]
    upload: Option<PathBuf>,

    /// Use an explicit config file instead of the platform default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    if cli.init {
        config.init_dirs()?;
        println!("Created {}", config.store_dir.display());
        println!("Created {}", config.mirror_dir.display());
        return Ok(());
    }

    let book = PhoneBook::new(config.clone());

    if let Some(path) = cli.upload {
        let report = book.import_from(&path)?;
        println!("Imported {} contacts.", report.imported);
        if report.skipped > 0 {
            println!("Skipped {} entries (empty or malformed).", report.skipped);
        }
        return Ok(());
    }

    let mut app = ui::app::App::new(&book, config.page_size)?;
    app.run()
}
