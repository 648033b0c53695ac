use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Classify personal color seasons from a swatch or a photo.
#[derive(Parser, Debug)]
#[command(name = "tonal", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a single hex color such as "#00BFFF"
    Color {
        /// Color in #RRGGBB form (the leading # is optional)
        hex: String,
    },

    /// Extract and classify the dominant colors of an image
    Image {
        /// Path to the input image (JPG, PNG, BMP, GIF)
        image: PathBuf,

        /// Number of dominant colors to extract
        #[arg(short = 'k', long = "colors")]
        colors: Option<usize>,

        /// Cluster every pixel instead of masking likely background
        #[arg(long)]
        keep_background: bool,

        /// JSON file with analyzer settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write the JSON document to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
