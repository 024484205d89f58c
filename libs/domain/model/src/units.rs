use serde::{Deserialize, Serialize};

/// Physical length unit used when converting pixel measurements to real-world
/// sizes. `Automatic` defers to the image's own OME pixel-size metadata;
/// `Pixels` reports raw pixel counts without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Units {
    Automatic,
    #[serde(rename = "Px")]
    Pixels,
    #[serde(rename = "nm")]
    Nanometer,
    #[serde(rename = "um")]
    Micrometer,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "km")]
    Kilometer,
}

impl Units {
    /// Conversion factor to meters, for units with a fixed metric scale.
    /// `Automatic` and `Pixels` have no fixed scale and return `None`.
    pub fn meters_per_unit(self) -> Option<f64> {
        match self {
            Units::Automatic | Units::Pixels => None,
            Units::Nanometer => Some(1e-9),
            Units::Micrometer => Some(1e-6),
            Units::Millimeter => Some(1e-3),
            Units::Centimeter => Some(1e-2),
            Units::Meter => Some(1.0),
            Units::Kilometer => Some(1e3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_and_automatic_have_no_fixed_scale() {
        assert_eq!(Units::Pixels.meters_per_unit(), None);
        assert_eq!(Units::Automatic.meters_per_unit(), None);
    }

    #[test]
    fn micrometer_converts_correctly() {
        assert_eq!(Units::Micrometer.meters_per_unit(), Some(1e-6));
    }

    #[test]
    fn serde_round_trip_uses_short_names() {
        let json = serde_json::to_string(&Units::Micrometer).unwrap();
        assert_eq!(json, "\"um\"");
        let back: Units = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Units::Micrometer);
    }
}
