use std::path::Path;

use image::imageops::FilterType;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageError};
use kmeans_colors::get_kmeans;
use log::{debug, warn};
use palette::Srgb;

use crate::color::Color;
use crate::config::AnalyzerConfig;
use crate::error::{Result, TonalError};

/// A color extracted from the image with its cluster population.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedColor {
    pub color: Color,
    /// Number of sampled pixels assigned to this cluster.
    pub population: usize,
}

/// Cluster indices are stored as u8 by the k-means backend.
pub const MAX_CLUSTERS: usize = 255;
/// Below this many surviving pixels the background mask is abandoned.
const MIN_MASKED_PIXELS: usize = 100;
/// Pixels whose channel sum reaches this are treated as white background.
const WHITE_CHANNEL_SUM: u16 = 750;

/// Load an image from disk, downscale it and return the pixels to cluster.
pub fn load_and_prepare(path: &Path, config: &AnalyzerConfig) -> Result<Vec<Srgb<f32>>> {
    if !path.exists() {
        return Err(TonalError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let img = image::open(path).map_err(|e| decode_error(e, &path.display().to_string(), path))?;
    Ok(prepare(img, config))
}

/// Decode an in-memory image (any format `image` can sniff) and return the
/// pixels to cluster.
pub fn prepare_bytes(bytes: &[u8], config: &AnalyzerConfig) -> Result<Vec<Srgb<f32>>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| decode_error(e, "<memory>", Path::new("<memory>")))?;
    Ok(prepare(img, config))
}

/// Decode a base64-encoded image and return the pixels to cluster.
pub fn prepare_base64(encoded: &str, config: &AnalyzerConfig) -> Result<Vec<Srgb<f32>>> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|source| TonalError::Base64 { source })?;
    prepare_bytes(&bytes, config)
}

fn decode_error(err: ImageError, source_name: &str, path: &Path) -> TonalError {
    match err {
        ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            TonalError::FileNotFound {
                path: path.to_path_buf(),
            }
        }
        ImageError::IoError(io) => TonalError::io(path, io),
        other => TonalError::UnsupportedFormat {
            path: source_name.to_string(),
            source: other,
        },
    }
}

/// Resize to fit within `max_dimension` (preserving aspect ratio), optionally
/// mask the background, and convert to sRGB floats.
fn prepare(img: DynamicImage, config: &AnalyzerConfig) -> Vec<Srgb<f32>> {
    let max_dim = config.max_dimension;
    let img = if img.width() > max_dim || img.height() > max_dim {
        img.resize(max_dim, max_dim, FilterType::Lanczos3)
    } else {
        img
    };
    let rgb_img = img.to_rgb8();
    debug!("sampling {}x{} pixels", rgb_img.width(), rgb_img.height());

    let pixels: Vec<Color> = rgb_img
        .pixels()
        .map(|p| Color::new(p[0], p[1], p[2]))
        .collect();

    let pixels = if config.remove_background {
        mask_background(&pixels, config.background_sensitivity)
    } else {
        pixels
    };

    pixels.into_iter().map(Color::to_srgb_f32).collect()
}

/// CIE lightness rescaled to the 8-bit 0-255 range.
fn lightness_u8(color: Color) -> f32 {
    (color.to_lab().l * 255.0 / 100.0).round()
}

/// Drop pixels that are probably background: CIE lightness outside a band
/// narrowed by `sensitivity`, or near-white. Falls back to the full pixel set
/// when too few pixels survive.
///
/// The band is open and measured on the 8-bit lightness scale with truncated
/// bounds, so sensitivity 0.3 keeps 8-bit L in (15, 239).
pub fn mask_background(pixels: &[Color], sensitivity: f32) -> Vec<Color> {
    let lower = (255.0 * sensitivity * 0.2).trunc();
    let upper = (255.0 * (1.0 - sensitivity * 0.2)).trunc();

    let kept: Vec<Color> = pixels
        .iter()
        .copied()
        .filter(|&c| {
            let l = lightness_u8(c);
            let sum = c.r as u16 + c.g as u16 + c.b as u16;
            l > lower && l < upper && sum < WHITE_CHANNEL_SUM
        })
        .collect();

    if kept.len() < MIN_MASKED_PIXELS {
        warn!(
            "background mask left {} of {} pixels; clustering the full image",
            kept.len(),
            pixels.len()
        );
        return pixels.to_vec();
    }
    debug!("background mask kept {} of {} pixels", kept.len(), pixels.len());
    kept
}

/// Run seeded K-means over sRGB pixels to extract `k` dominant colors.
///
/// Returns exactly `k` colors sorted by population (descending). Equal
/// populations keep the order in which their clusters first received a pixel.
pub fn extract_colors(
    pixels: &[Srgb<f32>],
    k: usize,
    config: &AnalyzerConfig,
) -> Result<Vec<ExtractedColor>> {
    if k < 1 {
        return Err(TonalError::invalid_parameter(
            "n_colors",
            k,
            "must be at least 1",
        ));
    }
    if k > MAX_CLUSTERS {
        return Err(TonalError::invalid_parameter(
            "n_colors",
            k,
            format!("must not exceed {MAX_CLUSTERS}"),
        ));
    }
    if k > pixels.len() {
        return Err(TonalError::invalid_parameter(
            "n_colors",
            k,
            format!("exceeds the {} sampled pixels", pixels.len()),
        ));
    }

    let result = get_kmeans(
        k,
        config.max_iterations,
        config.convergence,
        false,
        pixels,
        config.seed,
    );
    debug!("k-means (k={k}) finished with score {}", result.score);

    // Count pixels per centroid and remember where each cluster first appears
    let mut counts = vec![0usize; k];
    let mut first_seen = vec![usize::MAX; k];
    for (pos, &idx) in result.indices.iter().enumerate() {
        let idx = idx as usize;
        counts[idx] += 1;
        if first_seen[idx] == usize::MAX {
            first_seen[idx] = pos;
        }
    }

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| {
        counts[b]
            .cmp(&counts[a])
            .then(first_seen[a].cmp(&first_seen[b]))
    });

    let colors = order
        .into_iter()
        .map(|i| ExtractedColor {
            color: Color::from_srgb_f32_clamped(result.centroids[i]),
            population: counts[i],
        })
        .collect();

    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn srgb(r: u8, g: u8, b: u8) -> Srgb<f32> {
        Color::new(r, g, b).to_srgb_f32()
    }

    fn no_mask() -> AnalyzerConfig {
        AnalyzerConfig {
            remove_background: false,
            ..AnalyzerConfig::default()
        }
    }

    // --- load_and_prepare tests ---

    #[test]
    fn load_4x4_png() {
        let dir = fixture_dir();
        let path = dir.path().join("4x4_test.png");
        create_test_image_solid(&path, 4, 4, [128, 128, 128]);

        let pixels = load_and_prepare(&path, &no_mask()).unwrap();
        assert_eq!(pixels.len(), 16);
    }

    #[test]
    fn load_large_image_resizes() {
        let dir = fixture_dir();
        let path = dir.path().join("512x512_test.png");
        create_test_image_solid(&path, 512, 512, [128, 128, 128]);

        let pixels = load_and_prepare(&path, &no_mask()).unwrap();
        assert_eq!(pixels.len(), 256 * 256);
    }

    #[test]
    fn load_nonsquare_preserves_aspect_ratio() {
        let dir = fixture_dir();
        let path = dir.path().join("512x256_test.png");
        create_test_image_solid(&path, 512, 256, [128, 128, 128]);

        let pixels = load_and_prepare(&path, &no_mask()).unwrap();
        assert_eq!(pixels.len(), 256 * 128);
    }

    #[test]
    fn load_file_not_found() {
        let result = load_and_prepare(Path::new("/nonexistent/image.png"), &no_mask());
        match result {
            Err(TonalError::FileNotFound { path }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/image.png"))
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn load_unsupported_format() {
        let dir = fixture_dir();
        let path = dir.path().join("not_an_image.txt");
        std::fs::write(&path, "this is not an image").unwrap();

        let result = load_and_prepare(&path, &no_mask());
        assert!(
            matches!(result, Err(TonalError::UnsupportedFormat { .. })),
            "expected unsupported format error, got: {result:?}"
        );
    }

    #[test]
    fn garbage_bytes_are_unsupported() {
        let result = prepare_bytes(b"definitely not a png", &no_mask());
        assert!(matches!(result, Err(TonalError::UnsupportedFormat { .. })));
    }

    #[test]
    fn png_bytes_decode() {
        let img = image::RgbImage::from_fn(3, 2, |_, _| image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let pixels = prepare_bytes(&bytes, &no_mask()).unwrap();
        assert_eq!(pixels.len(), 6);
        assert_eq!(Color::from_srgb_f32_clamped(pixels[0]), Color::new(10, 20, 30));
    }

    #[test]
    fn base64_png_decodes() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        let encoded = STANDARD.encode(&bytes);

        let pixels = prepare_base64(&format!("{encoded}\n"), &no_mask()).unwrap();
        assert_eq!(pixels.len(), 4);
        assert_eq!(Color::from_srgb_f32_clamped(pixels[0]), Color::new(10, 20, 30));
    }

    #[test]
    fn base64_rejects_invalid_text() {
        let result = prepare_base64("not base64 at all!", &no_mask());
        assert!(matches!(result, Err(TonalError::Base64 { .. })));
    }

    #[test]
    fn base64_of_non_image_is_unsupported() {
        let encoded = STANDARD.encode(b"plain text");
        let result = prepare_base64(&encoded, &no_mask());
        assert!(matches!(result, Err(TonalError::UnsupportedFormat { .. })));
    }

    // --- mask_background tests ---

    #[test]
    fn mask_drops_white_and_black() {
        let mut pixels = vec![Color::new(200, 50, 50); 150];
        pixels.extend(vec![Color::new(255, 255, 255); 50]);
        pixels.extend(vec![Color::new(0, 0, 0); 50]);

        let kept = mask_background(&pixels, 0.3);
        assert_eq!(kept.len(), 150);
        assert!(kept.iter().all(|c| *c == Color::new(200, 50, 50)));
    }

    #[test]
    fn mask_uses_truncated_8bit_lightness_band() {
        // Gray 237 has L ~93.75, which rounds to 239 on the 8-bit scale
        let mut pixels = vec![Color::new(236, 236, 236); 150];
        pixels.extend(vec![Color::new(237, 237, 237); 100]);
        // Gray 19 sits at 15, gray 20 at 16
        pixels.extend(vec![Color::new(19, 19, 19); 100]);
        pixels.extend(vec![Color::new(20, 20, 20); 50]);

        let kept = mask_background(&pixels, 0.3);
        assert_eq!(kept.len(), 200);
        assert!(kept
            .iter()
            .all(|c| *c == Color::new(236, 236, 236) || *c == Color::new(20, 20, 20)));
    }

    #[test]
    fn mask_falls_back_when_too_few_survive() {
        let mut pixels = vec![Color::new(255, 255, 255); 500];
        pixels.extend(vec![Color::new(200, 50, 50); 10]);

        let kept = mask_background(&pixels, 0.3);
        assert_eq!(kept.len(), pixels.len());
    }

    // --- extract_colors tests ---

    #[test]
    fn returns_exactly_k_colors() {
        let mut pixels = vec![srgb(200, 50, 50); 600];
        pixels.extend(vec![srgb(50, 50, 200); 300]);
        pixels.extend(vec![srgb(50, 200, 50); 100]);

        let colors = extract_colors(&pixels, 5, &no_mask()).unwrap();
        assert_eq!(colors.len(), 5);
        let population: usize = colors.iter().map(|c| c.population).sum();
        assert_eq!(population, 1000);
    }

    #[test]
    fn results_sorted_by_population_descending() {
        let mut pixels = vec![srgb(200, 50, 50); 600];
        pixels.extend(vec![srgb(50, 50, 200); 300]);
        pixels.extend(vec![srgb(50, 200, 50); 100]);

        let colors = extract_colors(&pixels, 3, &no_mask()).unwrap();

        for window in colors.windows(2) {
            assert!(
                window[0].population >= window[1].population,
                "colors not sorted by population: {} < {}",
                window[0].population,
                window[1].population
            );
        }
        assert_eq!(colors[0].color, Color::new(200, 50, 50));
        assert_eq!(colors[0].population, 600);
    }

    #[test]
    fn equal_populations_keep_first_assignment_order() {
        let mut pixels = vec![srgb(50, 50, 200); 500];
        pixels.extend(vec![srgb(200, 50, 50); 500]);

        let colors = extract_colors(&pixels, 2, &no_mask()).unwrap();
        assert_eq!(colors[0].population, colors[1].population);
        assert_eq!(colors[0].color, Color::new(50, 50, 200));
        assert_eq!(colors[1].color, Color::new(200, 50, 50));
    }

    #[test]
    fn extraction_is_reproducible() {
        let pixels: Vec<Srgb<f32>> = (0..2000u32)
            .map(|i| srgb((i % 251) as u8, (i * 7 % 256) as u8, (i * 13 % 256) as u8))
            .collect();

        let a = extract_colors(&pixels, 5, &no_mask()).unwrap();
        let b = extract_colors(&pixels, 5, &no_mask()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_clusters_rejected() {
        let pixels = vec![srgb(1, 2, 3); 10];
        let err = extract_colors(&pixels, 0, &no_mask()).unwrap_err();
        assert!(matches!(err, TonalError::InvalidParameter { ref value, .. } if value == "0"));
    }

    #[test]
    fn more_clusters_than_pixels_rejected() {
        let pixels = vec![srgb(1, 2, 3); 4];
        assert!(matches!(
            extract_colors(&pixels, 5, &no_mask()),
            Err(TonalError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn cluster_limit_enforced() {
        let pixels = vec![srgb(1, 2, 3); 1000];
        assert!(matches!(
            extract_colors(&pixels, MAX_CLUSTERS + 1, &no_mask()),
            Err(TonalError::InvalidParameter { .. })
        ));
    }

    // --- test helpers ---

    fn create_test_image_solid(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
        let img = image::RgbImage::from_fn(width, height, |_, _| image::Rgb(rgb));
        img.save(path).unwrap();
    }
}
