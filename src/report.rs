use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Result, TonalError};
use crate::pipeline::aggregate::PaletteAnalysis;
use crate::pipeline::classify::ColorAnalysis;

fn round_to(v: f32, places: i32) -> f32 {
    let factor = 10f32.powi(places);
    (v * factor).round() / factor
}

/// Copy of the palette with the precision the JSON document carries:
/// HSV and Lab to 2 decimals, per-color confidence to 3.
fn rounded(palette: &PaletteAnalysis) -> PaletteAnalysis {
    let mut out = palette.clone();
    for c in &mut out.colors {
        c.hsv.hue = round_to(c.hsv.hue, 2);
        c.hsv.saturation = round_to(c.hsv.saturation, 2);
        c.hsv.value = round_to(c.hsv.value, 2);
        c.lab.l = round_to(c.lab.l, 2);
        c.lab.a = round_to(c.lab.a, 2);
        c.lab.b = round_to(c.lab.b, 2);
        c.confidence = round_to(c.confidence, 3);
    }
    out
}

/// Serialize the palette to its canonical JSON document.
pub fn to_json(palette: &PaletteAnalysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(&rounded(palette))?)
}

/// Write the JSON document to `path` as UTF-8, replacing any existing file.
pub fn save_json(palette: &PaletteAnalysis, path: &Path) -> Result<()> {
    let content = to_json(palette)?;
    std::fs::write(path, content).map_err(|e| TonalError::io(path, e))?;
    log::info!("wrote palette analysis to {}", path.display());
    Ok(())
}

/// Read a document written by [`save_json`]. Cluster populations are not
/// stored, so the result carries none.
pub fn load_json(path: &Path) -> Result<PaletteAnalysis> {
    let content = std::fs::read_to_string(path).map_err(|e| TonalError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

fn percent(v: f32) -> String {
    format!("{:.1}%", v * 100.0)
}

fn color_line(out: &mut String, rank: usize, color: &ColorAnalysis, weight: Option<f32>) {
    let _ = write!(
        out,
        "  {rank}. {}  RGB({}, {}, {})  HSV({:.1}°, {:.1}%, {:.1}%)  Lab({:.1}, {:.1}, {:.1})",
        color.hex,
        color.rgb.r,
        color.rgb.g,
        color.rgb.b,
        color.hsv.hue,
        color.hsv.saturation,
        color.hsv.value,
        color.lab.l,
        color.lab.a,
        color.lab.b,
    );
    if let Some(w) = weight {
        let _ = write!(out, "  [{}]", percent(w));
    }
    out.push('\n');
    let _ = writeln!(
        out,
        "     {}, saturação {}, {} -> {} ({})",
        color.temperature,
        color.saturation,
        color.luminosity,
        color.season,
        percent(color.confidence),
    );
}

/// Render the human-readable report.
pub fn generate_report(palette: &PaletteAnalysis) -> String {
    let total_population: usize = palette.populations.iter().sum();
    let weight = |i: usize| {
        palette
            .populations
            .get(i)
            .filter(|_| total_population > 0)
            .map(|&p| p as f32 / total_population as f32)
    };

    let mut out = String::new();
    out.push_str("=== Análise de Colorimetria Pessoal ===\n\n");
    let _ = writeln!(out, "Estação dominante: {}", palette.dominant_season);
    let _ = writeln!(out, "Confiança geral: {}", percent(palette.confidence));
    out.push('\n');

    out.push_str("Proporções:\n");
    let t = &palette.temperature;
    let _ = writeln!(out, "  Temperatura:  quentes {} | frias {}", t.warm, t.cold);
    let s = &palette.saturation;
    let _ = writeln!(
        out,
        "  Saturação:    baixa {} | media {} | alta {}",
        s.low, s.medium, s.high
    );
    let l = &palette.luminosity;
    let _ = writeln!(
        out,
        "  Luminosidade: escura {} | media {} | clara {}",
        l.dark, l.medium, l.light
    );
    out.push('\n');

    out.push_str("Cores principais:\n");
    for (i, color) in palette.colors.iter().enumerate() {
        color_line(&mut out, i + 1, color, weight(i));
    }
    out
}

/// Render a report for a single swatch.
pub fn color_report(color: &ColorAnalysis) -> String {
    let mut out = String::new();
    out.push_str("=== Análise de Cor ===\n\n");
    color_line(&mut out, 1, color, None);
    out
}
