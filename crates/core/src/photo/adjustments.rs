//! Display-time adjustments.
//!
//! These never touch the restored bytes. The presentation layer applies them
//! as a non-destructive overlay when rendering or exporting.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One adjustable display parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Brightness,
    Contrast,
    Saturation,
    Sharpness,
}

impl Adjustment {
    pub const ALL: [Adjustment; 4] = [
        Adjustment::Brightness,
        Adjustment::Contrast,
        Adjustment::Saturation,
        Adjustment::Sharpness,
    ];

    /// Allowed range, inclusive.
    pub fn range(&self) -> RangeInclusive<f32> {
        match self {
            Adjustment::Brightness | Adjustment::Contrast => 50.0..=150.0,
            Adjustment::Saturation => 0.0..=200.0,
            Adjustment::Sharpness => 0.0..=100.0,
        }
    }

    pub fn default_value(&self) -> f32 {
        match self {
            Adjustment::Brightness | Adjustment::Contrast | Adjustment::Saturation => 100.0,
            Adjustment::Sharpness => 0.0,
        }
    }

    /// Clamp `value` into range. NaN falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Brightness => "brightness",
            Adjustment::Contrast => "contrast",
            Adjustment::Saturation => "saturation",
            Adjustment::Sharpness => "sharpness",
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Adjustment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Adjustment::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown adjustment '{}'", s))
    }
}

/// The four display parameters of one photo. Always within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustments {
    brightness: f32,
    contrast: f32,
    saturation: f32,
    sharpness: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: Adjustment::Brightness.default_value(),
            contrast: Adjustment::Contrast.default_value(),
            saturation: Adjustment::Saturation.default_value(),
            sharpness: Adjustment::Sharpness.default_value(),
        }
    }
}

impl Adjustments {
    pub fn get(&self, adjustment: Adjustment) -> f32 {
        match adjustment {
            Adjustment::Brightness => self.brightness,
            Adjustment::Contrast => self.contrast,
            Adjustment::Saturation => self.saturation,
            Adjustment::Sharpness => self.sharpness,
        }
    }

    /// Set a value, clamped into range. Returns the stored value.
    pub fn set(&mut self, adjustment: Adjustment, value: f32) -> f32 {
        let value = adjustment.clamp(value);
        let slot = match adjustment {
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Saturation => &mut self.saturation,
            Adjustment::Sharpness => &mut self.sharpness,
        };
        *slot = value;
        value
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
