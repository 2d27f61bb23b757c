//! Air-quality classification
//!
//! Pure mapping from raw pollutant concentrations to a 5-level index per
//! pollutant and an overall worst-pollutant index. Breakpoints follow the
//! provider's AQI scale (µg/m³). No I/O, no state.

use serde::Serialize;

use crate::models::PollutantReadings;

/// Regulated pollutants, in the enumeration order used for the
/// worst-pollutant tie-break
const REGULATED: [Pollutant; 6] = [
    Pollutant::So2,
    Pollutant::No2,
    Pollutant::Pm10,
    Pollutant::Pm25,
    Pollutant::O3,
    Pollutant::Co,
];

/// One of the six pollutants that contribute to the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pollutant {
    So2,
    No2,
    Pm10,
    Pm25,
    O3,
    Co,
}

impl Pollutant {
    /// Short identifier matching the provider's component keys
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Pollutant::So2 => "so2",
            Pollutant::No2 => "no2",
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm25 => "pm2_5",
            Pollutant::O3 => "o3",
            Pollutant::Co => "co",
        }
    }

    /// Human-readable name with chemical formula
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Pollutant::So2 => "Sulphur dioxide (SO₂)",
            Pollutant::No2 => "Nitrogen dioxide (NO₂)",
            Pollutant::Pm10 => "Coarse particulates (PM10)",
            Pollutant::Pm25 => "Fine particulates (PM2.5)",
            Pollutant::O3 => "Ozone (O₃)",
            Pollutant::Co => "Carbon monoxide (CO)",
        }
    }

    /// Ascending index breakpoints in µg/m³; a concentration strictly below
    /// breakpoint `i` classifies at index `i + 1`, above all four at index 5
    #[must_use]
    pub fn breakpoints(&self) -> [f64; 4] {
        match self {
            Pollutant::So2 => [20.0, 80.0, 250.0, 350.0],
            Pollutant::No2 => [40.0, 70.0, 150.0, 200.0],
            Pollutant::Pm10 => [20.0, 50.0, 100.0, 200.0],
            Pollutant::Pm25 => [10.0, 25.0, 50.0, 75.0],
            Pollutant::O3 => [60.0, 100.0, 140.0, 180.0],
            Pollutant::Co => [4400.0, 9400.0, 12400.0, 15400.0],
        }
    }

    fn reading(&self, readings: &PollutantReadings) -> f64 {
        match self {
            Pollutant::So2 => readings.so2,
            Pollutant::No2 => readings.no2,
            Pollutant::Pm10 => readings.pm10,
            Pollutant::Pm25 => readings.pm2_5,
            Pollutant::O3 => readings.o3,
            Pollutant::Co => readings.co,
        }
    }
}

/// Status label for a 1..=5 index
#[must_use]
pub fn status_label(index: u8) -> &'static str {
    match index {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        _ => "Very Poor",
    }
}

/// Classification detail for one measured species
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PollutantDetail {
    /// Measured concentration in µg/m³
    pub value: f64,
    /// Index 1..=5; `None` for species excluded from indexing (NO, NH₃)
    pub index: Option<u8>,
    /// Status label for the index
    pub status: Option<&'static str>,
    /// Breakpoint the value sits under; `None` above the top breakpoint
    /// or for unindexed species
    pub threshold: Option<f64>,
}

/// Result of classifying one air-pollution measurement
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AirQualityAnalysis {
    /// Worst per-pollutant index, 1..=5
    pub overall_index: u8,
    /// Status label for the overall index
    pub overall_status: &'static str,
    /// Pollutant driving the overall index; `None` when every reading
    /// classifies as Good (no standout offender)
    pub worst_pollutant: Option<Pollutant>,
    /// Per-species detail keyed by the provider's component key,
    /// regulated pollutants first in enumeration order
    pub detailed: Vec<(&'static str, PollutantDetail)>,
}

impl AirQualityAnalysis {
    /// Name of the worst pollutant, or "nominal" when all readings are Good
    #[must_use]
    pub fn worst_pollutant_label(&self) -> &'static str {
        self.worst_pollutant
            .map_or("nominal", |p| p.display_name())
    }
}

fn classify(value: f64, breakpoints: &[f64; 4]) -> (u8, Option<f64>) {
    for (position, breakpoint) in breakpoints.iter().enumerate() {
        if value < *breakpoint {
            return (position as u8 + 1, Some(*breakpoint));
        }
    }
    (5, None)
}

/// Classify a pollution measurement into per-pollutant and overall indices.
///
/// The overall index is the maximum per-pollutant index; ties go to the
/// first pollutant reaching that maximum in enumeration order. NO and NH₃
/// are reported in the detail list but never indexed.
#[must_use]
pub fn analyze_air_quality(readings: &PollutantReadings) -> AirQualityAnalysis {
    let mut detailed = Vec::with_capacity(REGULATED.len() + 2);
    let mut overall_index = 1u8;
    let mut worst_pollutant = None;

    for pollutant in REGULATED {
        let value = pollutant.reading(readings);
        let (index, threshold) = classify(value, &pollutant.breakpoints());

        detailed.push((
            pollutant.key(),
            PollutantDetail {
                value,
                index: Some(index),
                status: Some(status_label(index)),
                threshold,
            },
        ));

        if index > overall_index {
            overall_index = index;
            worst_pollutant = Some(pollutant);
        }
    }

    // Measured but excluded from indexing
    for (key, value) in [("no", readings.no), ("nh3", readings.nh3)] {
        detailed.push((
            key,
            PollutantDetail {
                value,
                index: None,
                status: None,
                threshold: None,
            },
        ));
    }

    AirQualityAnalysis {
        overall_index,
        overall_status: status_label(overall_index),
        worst_pollutant,
        detailed,
    }
}
