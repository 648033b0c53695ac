//! Personal color analysis.
//!
//! Classifies a color swatch, or the dominant colors of an image, into one of
//! the four seasonal palettes (Spring, Summer, Autumn, Winter) and reports
//! temperature, saturation and luminosity statistics.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let swatch = tonal::analyze_color("#00BFFF")?;
//! println!("{} {}", swatch.season, swatch.confidence);
//!
//! let palette = tonal::analyze_image(Path::new("portrait.jpg"), 5)?;
//! print!("{}", tonal::generate_report(&palette));
//! tonal::save_json(&palette, Path::new("palette.json"))?;
//! # Ok::<(), tonal::TonalError>(())
//! ```

pub mod analyzer;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use analyzer::{analyze_color, analyze_image, Analyzer};
pub use color::{Color, HsvColor, LabColor};
pub use config::AnalyzerConfig;
pub use error::{Result, TonalError};
pub use pipeline::aggregate::PaletteAnalysis;
pub use pipeline::classify::{ColorAnalysis, Luminosity, Saturation, Season, Temperature};
pub use report::{generate_report, load_json, save_json, to_json};
