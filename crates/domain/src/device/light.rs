//! Light: `off`, `on`, with brightness and color attributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidAttributeError;

use super::DeviceKind;
use super::machine::{Guard, GuardVerdict, StateMachine, Transition};

pub const OFF: &str = "off";
pub const ON: &str = "on";

pub const DEFAULT_BRIGHTNESS: u8 = 50;
const MAX_BRIGHTNESS: u8 = 100;

/// Color tone of a light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Warm,
    Cool,
    #[default]
    Neutral,
}

impl Color {
    pub const ALL: [Self; 3] = [Self::Warm, Self::Cool, Self::Neutral];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = InvalidAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidAttributeError::Color(s.to_string()))
    }
}

/// A dimmable, tunable light.
///
/// Attributes are written through the setters, then confirmed by firing the
/// matching `set_brightness` / `set_color` trigger (a self-loop on `on`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Light {
    brightness: u8,
    color: Color,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            color: Color::default(),
        }
    }
}

impl Light {
    #[must_use]
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the brightness, in percent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAttributeError::Brightness`] outside `0..=100`.
    pub fn set_brightness(&mut self, value: i64) -> Result<(), InvalidAttributeError> {
        match u8::try_from(value) {
            Ok(brightness) if brightness <= MAX_BRIGHTNESS => {
                self.brightness = brightness;
                Ok(())
            }
            _ => Err(InvalidAttributeError::Brightness(value)),
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl StateMachine for Light {
    const KIND: DeviceKind = DeviceKind::Light;
    const STATES: &'static [&'static str] = &[OFF, ON];
    const INITIAL: &'static str = OFF;
    const TRANSITIONS: &'static [Transition] = &[
        Transition::new("turn_on", OFF, ON),
        Transition::new("turn_off", ON, OFF),
        Transition::new("set_brightness", ON, ON).guarded(Guard::BrightnessInRange),
        Transition::new("set_color", ON, ON).guarded(Guard::ColorValid),
    ];

    fn evaluate_guard(&self, guard: Guard, _state: &'static str) -> GuardVerdict {
        let valid = match guard {
            Guard::BrightnessInRange => self.brightness <= MAX_BRIGHTNESS,
            Guard::ColorValid => Color::ALL.contains(&self.color),
            Guard::DoorNotOpen => true,
        };
        if valid {
            GuardVerdict::Allow
        } else {
            GuardVerdict::Block(None)
        }
    }

    fn apply_arguments(
        &mut self,
        trigger: &str,
        args: &serde_json::Value,
    ) -> Result<(), InvalidAttributeError> {
        match trigger {
            "set_brightness" => {
                if let Some(value) = args.get("brightness") {
                    let brightness = value.as_i64().ok_or_else(|| InvalidAttributeError::Argument {
                        name: "brightness",
                        value: value.clone(),
                    })?;
                    self.set_brightness(brightness)?;
                }
            }
            "set_color" => {
                if let Some(value) = args.get("color") {
                    let color = value.as_str().ok_or_else(|| InvalidAttributeError::Argument {
                        name: "color",
                        value: value.clone(),
                    })?;
                    self.set_color(color.parse()?);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
