use time::OffsetDateTime;
use uuid::Uuid;

/// One stored reading for a user. All quantities are kWh.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub user_id: Uuid,
    pub ts: OffsetDateTime,
    pub consumption_kwh: f64,
    pub production_kwh: f64,
    pub nuclear_kwh: f64,
    pub wind_kwh: f64,
    pub hydroelectric_kwh: f64,
    pub oil_and_gas_kwh: f64,
    pub coal_kwh: f64,
    pub solar_kwh: f64,
    pub biomass_kwh: f64,
}

impl Reading {
    /// Every quantity with its column name, in table order.
    pub fn quantities(&self) -> [(&'static str, f64); 9] {
        [
            ("consumption_kwh", self.consumption_kwh),
            ("production_kwh", self.production_kwh),
            ("nuclear_kwh", self.nuclear_kwh),
            ("wind_kwh", self.wind_kwh),
            ("hydroelectric_kwh", self.hydroelectric_kwh),
            ("oil_and_gas_kwh", self.oil_and_gas_kwh),
            ("coal_kwh", self.coal_kwh),
            ("solar_kwh", self.solar_kwh),
            ("biomass_kwh", self.biomass_kwh),
        ]
    }
}
