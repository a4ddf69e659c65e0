use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repackjar::{Pipeline, build_tool};

use crate::cli::{App, Commands, InspectArg, RepackArg};

mod cli;

fn main() -> Result<()> {
    let app = App::parse();

    let filter = if app.verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match app.cmd {
        Commands::Repack(arg) => repack(arg),
        Commands::Inspect(arg) => inspect(arg),
    }
}

fn repack(arg: RepackArg) -> Result<()> {
    let config = arg.into_config()?;
    let tool = build_tool(&config)?;
    info!(
        "repacking {} in {}",
        config.final_name(),
        config.output_dir.display()
    );

    let summary = Pipeline::new(&config, tool.as_ref()).run()?;
    println!(
        "{}: {} nested jars stored, {} -> {} bytes",
        summary.output_path.display(),
        summary.dependencies,
        summary.original_size,
        summary.repacked_size
    );
    Ok(())
}

fn inspect(arg: InspectArg) -> Result<()> {
    let entries = repackjar_archive::inspect(&arg.archive)
        .with_context(|| format!("failed to inspect {}", arg.archive.display()))?;
    for entry in &entries {
        let method = if entry.is_stored() { "stored" } else { "compressed" };
        println!(
            "{method:>10} {:>10} {:>10}  {}",
            entry.size, entry.compressed_size, entry.name
        );
    }
    let compressed = entries.iter().filter(|e| !e.is_stored()).count();
    println!("{} entries, {compressed} compressed", entries.len());
    Ok(())
}
