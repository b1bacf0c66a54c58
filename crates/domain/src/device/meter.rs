//! Energy meter shared by powered appliances.

use crate::error::InvalidAttributeError;
use crate::time::{Timestamp, hours_between};

/// Accumulates `wattage × hours` while the appliance is in its powered state.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyMeter {
    wattage: u32,
    consumption_wh: f64,
    powered_since: Option<Timestamp>,
}

impl EnergyMeter {
    #[must_use]
    pub fn new(wattage: u32) -> Self {
        Self {
            wattage,
            consumption_wh: 0.0,
            powered_since: None,
        }
    }

    /// Rated power in watts.
    #[must_use]
    pub fn wattage(&self) -> u32 {
        self.wattage
    }

    /// Energy used so far, in watt-hours.
    #[must_use]
    pub fn consumption_wh(&self) -> f64 {
        self.consumption_wh
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.powered_since.is_some()
    }

    /// Change the rated power.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAttributeError::Wattage`] for negative or oversized values.
    pub fn set_wattage(&mut self, watts: i64) -> Result<(), InvalidAttributeError> {
        self.wattage = u32::try_from(watts).map_err(|_| InvalidAttributeError::Wattage(watts))?;
        Ok(())
    }

    /// Moment the current powered interval started, if running.
    #[must_use]
    pub fn powered_since(&self) -> Option<Timestamp> {
        self.powered_since
    }

    /// Restore the accumulated energy from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAttributeError::Consumption`] for negative or
    /// non-finite values; the meter is left unchanged.
    pub fn restore_consumption(&mut self, wh: f64) -> Result<(), InvalidAttributeError> {
        if !wh.is_finite() || wh < 0.0 {
            return Err(InvalidAttributeError::Consumption(wh));
        }
        self.consumption_wh = wh;
        Ok(())
    }

    pub(crate) fn start(&mut self, at: Timestamp) {
        self.powered_since = Some(at);
    }

    pub(crate) fn stop(&mut self, at: Timestamp) {
        if let Some(since) = self.powered_since.take() {
            self.consumption_wh += f64::from(self.wattage) * hours_between(since, at);
        }
    }
}
