use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use molview::{parse_smiles, Molecule, MolView, SanitizeStatus, ViewConfig, ViewEvent};

/// Renders a molecule with highlighted atoms to SVG
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input molecule as SMILES
    smiles: String,
    /// Selected atoms as a JSON list, e.g. "[1, 2, 3]"
    #[arg(short, long)]
    select: Option<String>,
    /// Depict aromatic rings as alternating single and double bonds
    #[arg(short, long)]
    kekulize: bool,
    /// TOML view configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output file, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Keep the molecule exactly as written, even if it cannot be sanitized
    #[arg(long)]
    no_sanitize: bool,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// More output per occurrence (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = verbosity_level(cli.verbose);

    env_logger::builder()
        .format_timestamp(None)
        .filter_level(level)
        .init();

    let mut config = match &cli.config {
        Some(path) => ViewConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ViewConfig::default(),
    };
    config.log_level = config.log_level.max(level);
    config.kekulize |= cli.kekulize;
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }

    let mol = if cli.no_sanitize {
        parse_smiles(&cli.smiles)
    } else {
        Molecule::from_smiles(&cli.smiles)
    }
    .with_context(|| format!("parsing SMILES {:?}", cli.smiles))?;
    log::info!(
        "{} atoms, {} bonds",
        mol.atom_count(),
        mol.bond_count()
    );

    let mut view = MolView::builder()
        .config(config)
        .listener(|event: &ViewEvent| {
            if let ViewEvent::SanitizeStatus(status) = event {
                match status {
                    SanitizeStatus::Sanitizable => log::info!("{status}"),
                    _ => log::warn!("{status}"),
                }
            }
        })
        .molecule(Some(Arc::new(mol)))
        .build();

    if let Some(select) = &cli.select {
        let value: serde_json::Value = serde_json::from_str(select)
            .with_context(|| format!("--select is not valid JSON: {select}"))?;
        view.set_selected_atoms_value(&value)
            .context("applying selection")?;
    }

    match &cli.output {
        Some(path) => std::fs::write(path, view.svg())
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", view.svg()),
    }
    Ok(())
}
