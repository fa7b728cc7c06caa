//! LoopTree Command Line Interface
//!
//! Usage:
//!   looptree [OPTIONS] <annotations.json>
//!   looptree --help
//!
//! Examples:
//!   looptree program.json                        # Print the tree outline
//!   looptree --sections program.json             # Also print candidate sections
//!   looptree --candidates skewing program.json   # Skewing candidates per root
//!   looptree --candidates all -vv program.json   # Every kind, with debug logs

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use looptree::config::TreeConfig;
use looptree::transform::ActionKind;
use looptree::tree::IteratorTree;
use std::path::PathBuf;

/// LoopTree - inspect the iterator tree of a program
#[derive(Parser, Debug)]
#[command(name = "looptree")]
#[command(version)]
#[command(about = "Iterator trees and transformation candidates for loop nests", long_about = None)]
struct Cli {
    /// Program annotation file (JSON)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print candidates of one transformation kind, or `all`
    #[arg(short, long, value_name = "KIND")]
    candidates: Option<String>,

    /// Print the candidate sections of every root
    #[arg(short, long)]
    sections: bool,

    /// Require parents to be listed before their children
    #[arg(long)]
    strict_order: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("LoopTree v{}", looptree::VERSION);
    debug!("Input file: {:?}", cli.input);

    let kinds = match cli.candidates.as_deref() {
        None => Vec::new(),
        Some(name) if name.eq_ignore_ascii_case("all") => ActionKind::ALL.to_vec(),
        Some(name) => vec![name
            .parse::<ActionKind>()
            .map_err(anyhow::Error::msg)
            .context("Invalid --candidates value")?],
    };

    let config = if cli.strict_order {
        TreeConfig::strict()
    } else {
        TreeConfig::default()
    };
    let tree = looptree::load_tree(&cli.input, &config)?;
    info!(
        "Loaded {} iterators, {} computations, {} roots",
        tree.len(),
        tree.computations().len(),
        tree.roots().len()
    );

    print!("{}", tree);

    if cli.sections {
        print_sections(&tree)?;
    }

    for kind in kinds {
        let candidates = kind
            .candidates(&tree)
            .with_context(|| format!("Failed to enumerate {} candidates", kind))?;
        debug!("{} {} candidates", candidates.len(), kind);
        println!("\n{} candidates:", kind);
        print!("{}", candidates);
    }

    Ok(())
}

fn print_sections(tree: &IteratorTree) -> Result<()> {
    println!("\nCandidate sections:");
    for (root, sections) in tree.candidate_sections()? {
        let rendered: Vec<String> = sections
            .iter()
            .map(|s| {
                let ids: Vec<String> = s.iter().map(|id| id.to_string()).collect();
                format!("[{}]", ids.join(", "))
            })
            .collect();
        println!("{}: [{}]", root, rendered.join(", "));
    }
    Ok(())
}
