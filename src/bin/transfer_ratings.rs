use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::Path;
use tunesync::library_parser::parse_library;
use tunesync::ratings::transfer_ratings;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: transfer_ratings <itunes_library.xml> <rhythmdb.xml> [--debug]");
        return Ok(());
    }

    let debug = args.iter().skip(3).any(|a| a == "--debug");
    let logger = tunesync::logging::init(debug, None)
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    let source = Path::new(&args[1]);
    let destination = Path::new(&args[2]);

    println!("Copying songs ratings:");
    println!(" - From\t{}", source.display());
    println!(" - To\t{}", destination.display());

    let library = parse_library(source).context("Failed to read iTunes Library XML")?;
    let summary = transfer_ratings(&library, destination)
        .context("Failed to update Rhythmbox database")?;

    println!("Successfully set ratings to {} song(s):", summary.total());
    println!(" - {} song(s) were edited.", summary.edited);
    println!(" - {} song(s) were added.", summary.added);
    if let Some(path) = logger.log_path() {
        println!("Log written to {}", path.display());
    }
    Ok(())
}
