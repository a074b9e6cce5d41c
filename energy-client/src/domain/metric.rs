use std::{fmt, str::FromStr};

use crate::domain::Reading;

/// A forecastable quantity. Each metric reads exactly one `Reading` column.
///
/// The column mapping is fixed: `geothermal` reads the nuclear column and
/// `biogas` the oil-and-gas column, matching the dashboards already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Solar,
    Wind,
    Geothermal,
    Biomass,
    Biogas,
    SmallHydro,
    Demand,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown metric '{given}'; allowed: {}", Metric::allowed_names())]
pub struct UnknownMetric {
    pub given: String,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Solar,
        Metric::Wind,
        Metric::Geothermal,
        Metric::Biomass,
        Metric::Biogas,
        Metric::SmallHydro,
        Metric::Demand,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Solar => "solar",
            Metric::Wind => "wind",
            Metric::Geothermal => "geothermal",
            Metric::Biomass => "biomass",
            Metric::Biogas => "biogas",
            Metric::SmallHydro => "small-hydro",
            Metric::Demand => "demand",
        }
    }

    /// Column in `energy_readings` holding this metric, in kWh.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Solar => "solar_kwh",
            Metric::Wind => "wind_kwh",
            Metric::Geothermal => "nuclear_kwh",
            Metric::Biomass => "biomass_kwh",
            Metric::Biogas => "oil_and_gas_kwh",
            Metric::SmallHydro => "hydroelectric_kwh",
            Metric::Demand => "consumption_kwh",
        }
    }

    /// Project a reading onto this metric's column.
    pub fn value_of(self, reading: &Reading) -> f64 {
        match self {
            Metric::Solar => reading.solar_kwh,
            Metric::Wind => reading.wind_kwh,
            Metric::Geothermal => reading.nuclear_kwh,
            Metric::Biomass => reading.biomass_kwh,
            Metric::Biogas => reading.oil_and_gas_kwh,
            Metric::SmallHydro => reading.hydroelectric_kwh,
            Metric::Demand => reading.consumption_kwh,
        }
    }

    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| UnknownMetric { given: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Solar".parse::<Metric>(), Ok(Metric::Solar));
        assert_eq!("DEMAND".parse::<Metric>(), Ok(Metric::Demand));
    }

    #[test]
    fn small_hydro_accepts_all_spellings() {
        for s in ["small-hydro", "Small hydro", "small_hydro"] {
            assert_eq!(s.parse::<Metric>(), Ok(Metric::SmallHydro), "{s}");
        }
    }

    #[test]
    fn unknown_metric_lists_allowed_set() {
        let err = "plutonium".parse::<Metric>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("plutonium"));
        for m in Metric::ALL {
            assert!(msg.contains(m.as_str()), "{msg} missing {m}");
        }
    }

    #[test]
    fn mapping_is_total_and_distinct() {
        let mut cols: Vec<_> = Metric::ALL.iter().map(|m| m.column()).collect();
        cols.sort();
        cols.dedup();
        assert_eq!(cols.len(), Metric::ALL.len());
        assert_eq!(Metric::Geothermal.column(), "nuclear_kwh");
        assert_eq!(Metric::Biogas.column(), "oil_and_gas_kwh");
    }
}
