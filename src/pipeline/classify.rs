//! Per-color classification: temperature, saturation and luminosity
//! categories plus the seasonal palette the color belongs to.
//!
//! Seasons are described as data ([`SEASON_PROFILES`]): each profile lists the
//! hue ranges, saturation bands and value bands typical for that season. A
//! color is scored against every profile by how far it falls outside those
//! bands, and the closest profile wins.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{Color, HsvColor, LabColor};

/// Warm or cold undertone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temperature {
    #[serde(rename = "quente")]
    Warm,
    #[serde(rename = "fria")]
    Cold,
}

/// Saturation band on the HSV saturation percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Saturation {
    #[serde(rename = "baixa")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

/// Luminosity band on the HSV value percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Luminosity {
    #[serde(rename = "escura")]
    Dark,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "clara")]
    Light,
}

/// The four classical personal-color seasons. Declaration order is the
/// tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "Primavera")]
    Spring,
    #[serde(rename = "Verão")]
    Summer,
    #[serde(rename = "Outono")]
    Autumn,
    #[serde(rename = "Inverno")]
    Winter,
}

impl Temperature {
    pub fn label(self) -> &'static str {
        match self {
            Temperature::Warm => "quente",
            Temperature::Cold => "fria",
        }
    }
}

impl Saturation {
    pub fn label(self) -> &'static str {
        match self {
            Saturation::Low => "baixa",
            Saturation::Medium => "media",
            Saturation::High => "alta",
        }
    }
}

impl Luminosity {
    pub fn label(self) -> &'static str {
        match self {
            Luminosity::Dark => "escura",
            Luminosity::Medium => "media",
            Luminosity::Light => "clara",
        }
    }
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Primavera",
            Season::Summer => "Verão",
            Season::Autumn => "Outono",
            Season::Winter => "Inverno",
        }
    }

    /// Position in [`Season::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

macro_rules! impl_display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

impl_display_label!(Temperature, Saturation, Luminosity, Season);

/// Complete analysis of a single color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAnalysis {
    pub hex: String,
    pub rgb: Color,
    pub hsv: HsvColor,
    pub lab: LabColor,
    #[serde(rename = "temperatura")]
    pub temperature: Temperature,
    #[serde(rename = "saturacao")]
    pub saturation: Saturation,
    #[serde(rename = "luminosidade")]
    pub luminosity: Luminosity,
    #[serde(rename = "estacao")]
    pub season: Season,
    /// Winning season score over the sum of all season scores, in (0, 1].
    #[serde(rename = "confianca")]
    pub confidence: f32,
}

/// Reference profile of a season in (hue, saturation, value) space.
#[derive(Debug, Clone, Copy)]
pub struct SeasonProfile {
    pub season: Season,
    /// Hue ranges in degrees, inclusive, non-wrapping.
    pub hues: &'static [(f32, f32)],
    /// Saturation bands in percent.
    pub saturation: &'static [(f32, f32)],
    /// Value bands in percent.
    pub value: &'static [(f32, f32)],
}

const WARM_HUES: &[(f32, f32)] = &[(0.0, 60.0), (300.0, 360.0)];
const COOL_HUES: &[(f32, f32)] = &[(120.0, 300.0)];

/// Profiles in [`Season::ALL`] order.
pub const SEASON_PROFILES: [SeasonProfile; 4] = [
    // Warm, light, clear
    SeasonProfile {
        season: Season::Spring,
        hues: WARM_HUES,
        saturation: &[(40.0, 90.0)],
        value: &[(65.0, 100.0)],
    },
    // Cool, soft, medium-light
    SeasonProfile {
        season: Season::Summer,
        hues: COOL_HUES,
        saturation: &[(10.0, 50.0)],
        value: &[(50.0, 90.0)],
    },
    // Warm, rich, medium-dark
    SeasonProfile {
        season: Season::Autumn,
        hues: WARM_HUES,
        saturation: &[(40.0, 100.0)],
        value: &[(20.0, 65.0)],
    },
    // Cool, vivid or achromatic, at either end of the value scale
    SeasonProfile {
        season: Season::Winter,
        hues: COOL_HUES,
        saturation: &[(0.0, 10.0), (70.0, 100.0)],
        value: &[(0.0, 30.0), (85.0, 100.0)],
    },
];

/// Degrees of hue gap that count as one unit of distance.
const HUE_SCALE: f32 = 60.0;
/// Percentage points of saturation/value gap that count as one unit.
const BAND_SCALE: f32 = 20.0;

/// Classify warm vs. cold.
///
/// Hues in [0, 60] and [300, 360) are warm, [120, 240] cold. The yellow-green
/// (60-120) and blue-violet (240-300) gaps follow the sign of Lab a*: a
/// magenta lean is warm, a green lean is cold.
pub fn classify_temperature(hue: f32, lab_a: f32) -> Temperature {
    let hue = hue.rem_euclid(360.0);
    if hue <= 60.0 || hue >= 300.0 {
        Temperature::Warm
    } else if (120.0..=240.0).contains(&hue) {
        Temperature::Cold
    } else if lab_a > 0.0 {
        Temperature::Warm
    } else {
        Temperature::Cold
    }
}

/// Both 30 and 70 belong to the medium band.
pub fn classify_saturation(saturation: f32) -> Saturation {
    if saturation < 30.0 {
        Saturation::Low
    } else if saturation <= 70.0 {
        Saturation::Medium
    } else {
        Saturation::High
    }
}

/// Both 35 and 65 belong to the medium band.
pub fn classify_luminosity(value: f32) -> Luminosity {
    if value < 35.0 {
        Luminosity::Dark
    } else if value <= 65.0 {
        Luminosity::Medium
    } else {
        Luminosity::Light
    }
}

fn band_gap(x: f32, bands: &[(f32, f32)]) -> f32 {
    bands
        .iter()
        .map(|&(lo, hi)| {
            if x < lo {
                lo - x
            } else if x > hi {
                x - hi
            } else {
                0.0
            }
        })
        .fold(f32::INFINITY, f32::min)
}

fn circular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs().rem_euclid(360.0);
    d.min(360.0 - d)
}

fn hue_gap(hue: f32, ranges: &[(f32, f32)]) -> f32 {
    ranges
        .iter()
        .map(|&(lo, hi)| {
            if (lo..=hi).contains(&hue) {
                0.0
            } else {
                circular_distance(hue, lo).min(circular_distance(hue, hi))
            }
        })
        .fold(f32::INFINITY, f32::min)
}

impl SeasonProfile {
    /// Match score in (0, 1]; 1 means the color sits inside every band.
    ///
    /// Hue counts in proportion to saturation, since it carries no
    /// information for grays.
    pub fn score(&self, hsv: &HsvColor) -> f32 {
        let hue_weight = hsv.saturation / 100.0;
        let distance = hue_weight * hue_gap(hsv.hue, self.hues) / HUE_SCALE
            + band_gap(hsv.saturation, self.saturation) / BAND_SCALE
            + band_gap(hsv.value, self.value) / BAND_SCALE;
        1.0 / (1.0 + distance)
    }
}

/// Score every season profile for `hsv`, in [`Season::ALL`] order.
pub fn season_scores(hsv: &HsvColor) -> [f32; 4] {
    SEASON_PROFILES.map(|profile| profile.score(hsv))
}

/// Pick the best-matching season and its normalized confidence.
pub fn classify_season(hsv: &HsvColor) -> (Season, f32) {
    let scores = season_scores(hsv);
    let best = strongest(&scores);
    let total: f32 = scores.iter().sum();
    (best, scores[best.index()] / total)
}

/// Arg-max over season scores; the earlier season wins a tie.
fn strongest(scores: &[f32; 4]) -> Season {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    Season::ALL[best]
}

/// Run the full single-color classification.
pub fn classify_color(color: Color) -> ColorAnalysis {
    let hsv = color.to_hsv();
    let lab = color.to_lab();
    let (season, confidence) = classify_season(&hsv);

    let analysis = ColorAnalysis {
        hex: color.to_hex(),
        rgb: color,
        hsv,
        lab,
        temperature: classify_temperature(hsv.hue, lab.a),
        saturation: classify_saturation(hsv.saturation),
        luminosity: classify_luminosity(hsv.value),
        season,
        confidence,
    };
    debug!(
        "{} -> {} {} {} {} ({:.3})",
        analysis.hex,
        analysis.temperature,
        analysis.saturation,
        analysis.luminosity,
        analysis.season,
        analysis.confidence
    );
    analysis
}
