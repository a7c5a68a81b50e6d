use std::ops::RangeInclusive;

use four_cc::FourCC;

use super::{Parameter, ParameterType};

// -------------------------------------------------------------------------------------------------

/// A continuous (float) parameter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatParameter {
    id: FourCC,
    name: &'static str,
    range: RangeInclusive<f32>,
    default: f32,
    unit: &'static str,
}

impl FloatParameter {
    /// Create a new float parameter descriptor.
    pub const fn new(
        id: FourCC,
        name: &'static str,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        assert!(
            default >= *range.start() && default <= *range.end(),
            "Invalid parameter default value"
        );
        Self {
            id,
            name,
            range,
            default,
            unit: "",
        }
    }

    /// Optional unit for string displays.
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// The parameter's unit string, if any.
    pub fn unit(&self) -> &'static str {
        self.unit
    }
}

impl Parameter for FloatParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Float
    }

    fn range(&self) -> (f32, f32) {
        (*self.range.start(), *self.range.end())
    }

    fn default_value(&self) -> f32 {
        self.default
    }

    fn clamp_value(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(*self.range.start(), *self.range.end())
        }
    }

    fn value_to_string(&self, value: f32, include_unit: bool) -> String {
        if include_unit && !self.unit.is_empty() {
            format!("{:.2} {}", value, self.unit)
        } else {
            format!("{:.2}", value)
        }
    }

    fn string_to_value(&self, string: &str) -> Option<f32> {
        let value = string
            .trim()
            .trim_end_matches(self.unit)
            .trim()
            .parse::<f32>()
            .ok()?;
        Some(self.clamp_value(value))
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: FloatParameter =
        FloatParameter::new(FourCC(*b"test"), "Rate", -5.0..=5.0, 1.0).with_unit("Hz");

    #[test]
    fn clamping_and_conversion() {
        assert_eq!(RATE.clamp_value(10.0), 5.0);
        assert_eq!(RATE.clamp_value(-10.0), -5.0);
        assert_eq!(RATE.clamp_value(f32::NAN), 1.0);
        assert_eq!(RATE.normalize_value(0.0), 0.5);
        assert_eq!(RATE.denormalize_value(1.0), 5.0);
        assert_eq!(RATE.value_to_string(1.5, true), "1.50 Hz");
        assert_eq!(RATE.value_to_string(1.5, false), "1.50");
        assert_eq!(RATE.string_to_value(" 2.5 Hz"), Some(2.5));
        assert_eq!(RATE.string_to_value("99"), Some(5.0));
        assert_eq!(RATE.string_to_value("fast"), None);
    }
}
