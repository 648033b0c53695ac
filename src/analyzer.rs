use std::path::Path;

use log::info;
use palette::Srgb;

use crate::color::Color;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::pipeline::aggregate::{aggregate, PaletteAnalysis};
use crate::pipeline::classify::{classify_color, ColorAnalysis};
use crate::pipeline::extract::{extract_colors, load_and_prepare, prepare_base64, prepare_bytes};

/// Stateless colorimetry engine.
///
/// Holds only its configuration; each call works on local state, so one
/// analyzer can be shared across threads without locking.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Build an analyzer, rejecting configurations the extractor cannot use.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Classify a single `#RRGGBB` swatch.
    pub fn analyze_color(&self, hex: &str) -> Result<ColorAnalysis> {
        let color = Color::from_hex(hex)?;
        Ok(classify_color(color))
    }

    /// Extract `n_colors` dominant colors from the image at `path` and
    /// classify the palette.
    pub fn analyze_image(&self, path: &Path, n_colors: usize) -> Result<PaletteAnalysis> {
        let pixels = load_and_prepare(path, &self.config)?;
        let palette = self.analyze_pixels(&pixels, n_colors)?;
        info!(
            "{}: {} ({:.1}% confidence)",
            path.display(),
            palette.dominant_season,
            palette.confidence * 100.0
        );
        Ok(palette)
    }

    /// Analyze the image at `path` extracting the configured `n_colors`.
    pub fn analyze_file(&self, path: &Path) -> Result<PaletteAnalysis> {
        self.analyze_image(path, self.config.n_colors)
    }

    /// Same as [`Analyzer::analyze_image`] for an encoded image held in memory.
    pub fn analyze_image_bytes(&self, bytes: &[u8], n_colors: usize) -> Result<PaletteAnalysis> {
        let pixels = prepare_bytes(bytes, &self.config)?;
        self.analyze_pixels(&pixels, n_colors)
    }

    /// Same as [`Analyzer::analyze_image_bytes`] for base64 text.
    pub fn analyze_image_base64(&self, encoded: &str, n_colors: usize) -> Result<PaletteAnalysis> {
        let pixels = prepare_base64(encoded, &self.config)?;
        self.analyze_pixels(&pixels, n_colors)
    }

    fn analyze_pixels(&self, pixels: &[Srgb<f32>], n_colors: usize) -> Result<PaletteAnalysis> {
        let extracted = extract_colors(pixels, n_colors, &self.config)?;
        let (colors, populations): (Vec<ColorAnalysis>, Vec<usize>) = extracted
            .into_iter()
            .map(|e| (classify_color(e.color), e.population))
            .unzip();
        aggregate(colors, populations)
    }
}

/// Classify a single swatch with the default configuration.
pub fn analyze_color(hex: &str) -> Result<ColorAnalysis> {
    Analyzer::default().analyze_color(hex)
}

/// Analyze an image file with the default configuration.
pub fn analyze_image(path: &Path, n_colors: usize) -> Result<PaletteAnalysis> {
    Analyzer::default().analyze_image(path, n_colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TonalError;
    use crate::pipeline::classify::Season;

    fn png_bytes(img: &image::RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }

    #[test]
    fn analyze_color_reference() {
        let a = analyze_color("#00BFFF").unwrap();
        assert_eq!(a.temperature.label(), "fria");
        assert_eq!(a.saturation.label(), "alta");
        assert_eq!(a.luminosity.label(), "clara");
        assert_eq!(a, analyze_color("#00BFFF").unwrap());
    }

    #[test]
    fn analyze_color_rejects_bad_hex() {
        assert!(matches!(
            analyze_color("GGGGGG"),
            Err(TonalError::Format { .. })
        ));
    }

    fn two_regions() -> image::RgbImage {
        image::RgbImage::from_fn(20, 10, |x, _| {
            if x < 14 {
                image::Rgb([139, 69, 19])
            } else {
                image::Rgb([143, 163, 191])
            }
        })
    }

    #[test]
    fn new_validates_config() {
        let zero_iterations = AnalyzerConfig {
            max_iterations: 0,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(
            Analyzer::new(zero_iterations),
            Err(TonalError::InvalidParameter { ref parameter, .. }) if parameter == "max_iterations"
        ));

        let zero_dimension = AnalyzerConfig {
            max_dimension: 0,
            ..AnalyzerConfig::default()
        };
        assert!(Analyzer::new(zero_dimension).is_err());
        assert!(Analyzer::new(AnalyzerConfig::default()).is_ok());
    }

    #[test]
    fn analyze_file_uses_configured_color_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.png");
        two_regions().save(&path).unwrap();

        let analyzer = Analyzer::new(AnalyzerConfig {
            n_colors: 2,
            ..AnalyzerConfig::default()
        })
        .unwrap();
        let palette = analyzer.analyze_file(&path).unwrap();
        assert_eq!(palette.colors.len(), 2);
        assert_eq!(palette.populations, vec![140, 60]);
    }

    #[test]
    fn analyze_base64_matches_bytes() {
        use base64::Engine;

        let bytes = png_bytes(&two_regions());
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let analyzer = Analyzer::default();

        let from_text = analyzer.analyze_image_base64(&encoded, 2).unwrap();
        let from_bytes = analyzer.analyze_image_bytes(&bytes, 2).unwrap();
        assert_eq!(from_text, from_bytes);
        assert!(matches!(
            analyzer.analyze_image_base64("%%%", 2),
            Err(TonalError::Base64 { .. })
        ));
    }

    #[test]
    fn analyze_bytes_two_regions() {
        let img = two_regions();
        let palette = Analyzer::default()
            .analyze_image_bytes(&png_bytes(&img), 2)
            .unwrap();

        assert_eq!(palette.colors.len(), 2);
        assert_eq!(palette.populations, vec![140, 60]);
        assert_eq!(palette.colors[0].hex, "#8b4513");
        assert_eq!(palette.colors[0].season, Season::Autumn);
        assert_eq!(palette.colors[1].season, Season::Summer);
        assert_eq!(palette.dominant_season, Season::Autumn);
    }
}
