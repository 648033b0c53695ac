use serde::{Deserialize, Serialize};

use crate::error::{Result, TonalError};
use crate::pipeline::classify::{ColorAnalysis, Luminosity, Saturation, Season, Temperature};

/// Warm/cold color counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureCounts {
    #[serde(rename = "quentes")]
    pub warm: usize,
    #[serde(rename = "frias")]
    pub cold: usize,
}

/// Low/medium/high saturation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaturationCounts {
    #[serde(rename = "baixa")]
    pub low: usize,
    #[serde(rename = "media")]
    pub medium: usize,
    #[serde(rename = "alta")]
    pub high: usize,
}

/// Dark/medium/light counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuminosityCounts {
    #[serde(rename = "escura")]
    pub dark: usize,
    #[serde(rename = "media")]
    pub medium: usize,
    #[serde(rename = "clara")]
    pub light: usize,
}

impl TemperatureCounts {
    pub fn total(&self) -> usize {
        self.warm + self.cold
    }
}

impl SaturationCounts {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

impl LuminosityCounts {
    pub fn total(&self) -> usize {
        self.dark + self.medium + self.light
    }
}

/// Palette-level result of an image analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteAnalysis {
    #[serde(rename = "estacao_dominante")]
    pub dominant_season: Season,
    #[serde(rename = "confianca_geral")]
    pub confidence: f32,
    #[serde(rename = "proporcao_temperatura")]
    pub temperature: TemperatureCounts,
    #[serde(rename = "proporcao_saturacao")]
    pub saturation: SaturationCounts,
    #[serde(rename = "proporcao_luminosidade")]
    pub luminosity: LuminosityCounts,
    /// Dominant-first order.
    #[serde(rename = "cores_principais")]
    pub colors: Vec<ColorAnalysis>,
    /// Pixel population behind each color; empty when unknown (single
    /// swatches, palettes read back from JSON).
    #[serde(skip)]
    pub populations: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SeasonTally {
    population: usize,
    confidence: f32,
    first_index: Option<usize>,
}

/// Combine classified colors into palette statistics.
///
/// `populations` holds the cluster size of each color, or is empty to weight
/// every color equally. The dominant season is the one with the largest total
/// population; ties go to the larger summed confidence, then to the season that
/// appears first in `colors`. Overall confidence is the population-weighted
/// mean over all colors.
pub fn aggregate(colors: Vec<ColorAnalysis>, populations: Vec<usize>) -> Result<PaletteAnalysis> {
    if colors.is_empty() {
        return Err(TonalError::invalid_parameter(
            "colors",
            0,
            "at least one color is required",
        ));
    }
    if !populations.is_empty() && populations.len() != colors.len() {
        return Err(TonalError::invalid_parameter(
            "populations",
            populations.len(),
            format!("expected one entry per color ({})", colors.len()),
        ));
    }

    let weight_of = |i: usize| populations.get(i).copied().unwrap_or(1);

    let mut temperature = TemperatureCounts::default();
    let mut saturation = SaturationCounts::default();
    let mut luminosity = LuminosityCounts::default();
    let mut tallies = [SeasonTally::default(); 4];

    let mut weighted_confidence = 0.0f64;
    let mut total_weight = 0usize;

    for (i, color) in colors.iter().enumerate() {
        match color.temperature {
            Temperature::Warm => temperature.warm += 1,
            Temperature::Cold => temperature.cold += 1,
        }
        match color.saturation {
            Saturation::Low => saturation.low += 1,
            Saturation::Medium => saturation.medium += 1,
            Saturation::High => saturation.high += 1,
        }
        match color.luminosity {
            Luminosity::Dark => luminosity.dark += 1,
            Luminosity::Medium => luminosity.medium += 1,
            Luminosity::Light => luminosity.light += 1,
        }

        let weight = weight_of(i);
        let tally = &mut tallies[color.season.index()];
        tally.population += weight;
        tally.confidence += color.confidence;
        tally.first_index.get_or_insert(i);

        weighted_confidence += weight as f64 * color.confidence as f64;
        total_weight += weight;
    }

    let dominant_season = Season::ALL
        .into_iter()
        .filter(|s| tallies[s.index()].first_index.is_some())
        .max_by(|a, b| {
            let (ta, tb) = (&tallies[a.index()], &tallies[b.index()]);
            ta.population
                .cmp(&tb.population)
                .then(ta.confidence.total_cmp(&tb.confidence))
                // Earlier first appearance ranks higher
                .then(tb.first_index.cmp(&ta.first_index))
        })
        .unwrap_or(colors[0].season);

    let confidence = if total_weight > 0 {
        (weighted_confidence / total_weight as f64) as f32
    } else {
        // All clusters empty cannot come out of extraction; fall back to a plain mean
        colors.iter().map(|c| c.confidence).sum::<f32>() / colors.len() as f32
    };

    Ok(PaletteAnalysis {
        dominant_season,
        confidence,
        temperature,
        saturation,
        luminosity,
        colors,
        populations,
    })
}
