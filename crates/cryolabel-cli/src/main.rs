use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cryolabel::{GenerateRequest, LabelSpec, PartialRange, TemplateRegistry};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cryolabel", about = "Cryovial label sheet generator", version)]
struct Cli {
    /// Extra label templates (JSON array)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a label PDF from a preset
    Generate {
        /// Preset JSON file
        preset: PathBuf,

        /// Data file for file presets (.csv, .xlsx, .xls, .ods)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Label text, or the starting serial for incremental presets
        #[arg(short, long)]
        text: Option<String>,

        /// Output PDF file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Copies per label (overrides the preset)
        #[arg(short, long)]
        copies: Option<usize>,

        /// Partial first sheet as START_ROW,START_COL,END_ROW,END_COL
        #[arg(long, value_parser = parse_partial)]
        partial: Option<PartialRange>,
    },

    /// Show how a preset's labels would spread over sheets
    Plan {
        /// Preset JSON file
        preset: PathBuf,

        /// Data file for file presets
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Label text, or the starting serial for incremental presets
        #[arg(short, long)]
        text: Option<String>,

        /// Copies per label (overrides the preset)
        #[arg(short, long)]
        copies: Option<usize>,

        /// Partial first sheet as START_ROW,START_COL,END_ROW,END_COL
        #[arg(long, value_parser = parse_partial)]
        partial: Option<PartialRange>,
    },

    /// List available label templates
    Templates,
}

fn parse_partial(value: &str) -> std::result::Result<PartialRange, String> {
    let parts: Vec<usize> = value
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("expected four numbers: {e}"))?;
    match parts[..] {
        [start_row, start_col, end_row, end_col] => {
            Ok(PartialRange::new(start_row, start_col, end_row, end_col))
        }
        _ => Err(format!("expected START_ROW,START_COL,END_ROW,END_COL, got {value:?}")),
    }
}

async fn load_preset(path: &Path) -> Result<LabelSpec> {
    LabelSpec::load(path)
        .await
        .with_context(|| format!("loading preset {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut registry = TemplateRegistry::builtin();
    if let Some(path) = &cli.templates {
        let added = registry
            .load_json(path)
            .await
            .with_context(|| format!("loading templates from {}", path.display()))?;
        log::info!("Added {added} templates from {}", path.display());
    }

    match cli.command {
        Commands::Generate {
            preset,
            input,
            text,
            output,
            copies,
            partial,
        } => {
            let spec = load_preset(&preset).await?;
            let request = GenerateRequest {
                input_path: input,
                text,
                output_path: output,
                copies,
                partial_range: partial,
            };
            let path = cryolabel::generate_labels(&spec, &registry, &request).await?;
            println!("Generated labels → {}", path.display());
        }

        Commands::Plan {
            preset,
            input,
            text,
            copies,
            partial,
        } => {
            let spec = load_preset(&preset).await?;
            let template = cryolabel::resolve_template(&spec, &registry)?;
            let request = GenerateRequest {
                input_path: input,
                text,
                copies,
                partial_range: partial,
                ..Default::default()
            };
            let source = cryolabel::load_source(&spec, &request).await?;
            let stats = cryolabel::plan_labels(&spec, template, source, &request)?;

            println!("Layout for {} on {}:", spec.name, template.display_name);
            println!("  First page capacity: {}", stats.first_page_capacity);
            println!("  Page capacity: {}", stats.page_capacity);
            println!("  Total labels: {}", stats.total_labels);
            println!("  Sheets: {}", stats.pages);
            println!("  Labels on last sheet: {}", stats.labels_on_last_page);
            println!("  Blank cells on last sheet: {}", stats.blank_cells_on_last_page);
        }

        Commands::Templates => {
            for template in registry.iter() {
                println!(
                    "{:<20} {:<45} {:>4} labels  {}",
                    template.key,
                    template.display_name,
                    template.labels_per_sheet(),
                    template.arrangement
                );
            }
        }
    }

    Ok(())
}
