use serde::{Deserialize, Serialize};

/// Daily weather summary carried on each route feature. `code` is a WMO
/// weather interpretation code, temperatures are °F and precipitation inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub code: u16,
    pub max: f64,
    pub min: f64,
    #[serde(default)]
    pub precip: f64,
}

impl Weather {
    pub fn description(&self) -> &'static str {
        match self.code {
            0 => "Clear Skies",
            1 => "Mainly Clear",
            2 => "Partly Cloudy",
            3 => "Overcast",
            51 => "Light Drizzle",
            53 => "Drizzle",
            55 => "Heavy Drizzle",
            61 => "Slight Rain",
            63 => "Moderate Rain",
            65 => "Heavy Rain",
            95 => "Thunderstorms",
            _ => "Variable Conditions",
        }
    }

    pub fn has_precipitation(&self) -> bool {
        self.precip > 0.0
    }
}
