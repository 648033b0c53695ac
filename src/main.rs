use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use tonal::cli::{Args, Command, OutputFormat};
use tonal::config::AnalyzerConfig;
use tonal::report::{color_report, generate_report, save_json, to_json};
use tonal::Analyzer;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Color { hex } => {
            let analysis = Analyzer::default()
                .analyze_color(&hex)
                .with_context(|| format!("could not analyze color {hex}"))?;
            match args.format {
                OutputFormat::Text => print!("{}", color_report(&analysis)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
            }
        }
        Command::Image {
            image,
            colors,
            keep_background,
            config,
            json,
        } => {
            let mut settings = match &config {
                Some(path) => AnalyzerConfig::from_json_file(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => AnalyzerConfig::default(),
            };
            if let Some(n) = colors {
                settings.n_colors = n;
            }
            if keep_background {
                settings.remove_background = false;
            }

            let analyzer = Analyzer::new(settings).context("invalid analyzer settings")?;
            let palette = analyzer
                .analyze_file(&image)
                .with_context(|| format!("could not analyze {}", image.display()))?;

            match args.format {
                OutputFormat::Text => print!("{}", generate_report(&palette)),
                OutputFormat::Json => println!("{}", to_json(&palette)?),
            }
            if let Some(path) = json {
                save_json(&palette, &path)?;
            }
        }
    }

    Ok(())
}
