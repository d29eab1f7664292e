//! CLI argument parsing and run orchestration.

pub mod args;

use anyhow::{Context, Result};
use args::Cli;
use certgen_cfssl::{Cfssl, DEFAULT_PROGRAM};
use certgen_core::{generate, resolve_str, SigningProfile};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::issue;
use crate::layout::OutputLayout;
use crate::logging;
use crate::settings::Settings;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    debug!(?settings, "loaded settings");

    // Resolve and generate everything before touching the output directory.
    let input = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("failed to read {}", cli.config.display()))?;
    let config = resolve_str(&input)
        .with_context(|| format!("invalid cluster description {}", cli.config.display()))?;
    info!(
        cluster = %config.cluster_name,
        nodes = config.nodes.len(),
        "resolved cluster description"
    );
    let docs = generate(&config);

    if cli.dry_run {
        println!("{}", cli.output.render(&docs)?);
        return Ok(());
    }

    let layout = OutputLayout::new(&cli.out_dir, settings.json_dir());
    let written = layout.write_documents(&docs).await?;
    println!(
        "{} wrote {} documents to {}",
        "Success:".green().bold(),
        written.len(),
        layout.json_dir().display().to_string().cyan()
    );

    if cli.no_issue {
        return Ok(());
    }

    let program = cli
        .cfssl
        .or(settings.cfssl.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));
    let cfssl = Cfssl::builder()
        .program(program)
        .timeout(settings.timeout())
        .build();
    let profile = SigningProfile::from(cli.profile);

    let issued = issue::issue_all(&cfssl, &layout, &docs, profile).await?;

    println!(
        "{} CA {} -> {}",
        "Issued:".green().bold(),
        config.cluster_name.cyan(),
        issued.ca.cert.display()
    );
    for (node, files) in &issued.nodes {
        println!(
            "{} {} ({profile}) -> {}",
            "Issued:".green().bold(),
            node.cyan(),
            files.cert.display()
        );
    }

    Ok(())
}
