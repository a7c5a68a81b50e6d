use std::ops::RangeInclusive;

use four_cc::FourCC;

use super::{Parameter, ParameterType};

// -------------------------------------------------------------------------------------------------

/// A discrete (integer) parameter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerParameter {
    id: FourCC,
    name: &'static str,
    range: RangeInclusive<i32>,
    default: i32,
}

impl IntegerParameter {
    pub const fn new(
        id: FourCC,
        name: &'static str,
        range: RangeInclusive<i32>,
        default: i32,
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
        }
    }

    pub fn int_range(&self) -> &RangeInclusive<i32> {
        &self.range
    }

    /// Sanitize and convert a plain float value to the parameter's integer value.
    pub fn clamp_int(&self, value: f32) -> i32 {
        if value.is_nan() {
            self.default
        } else {
            (value.round() as i32).clamp(*self.range.start(), *self.range.end())
        }
    }
}

impl Parameter for IntegerParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Integer
    }

    fn range(&self) -> (f32, f32) {
        (*self.range.start() as f32, *self.range.end() as f32)
    }

    fn default_value(&self) -> f32 {
        self.default as f32
    }

    fn clamp_value(&self, value: f32) -> f32 {
        self.clamp_int(value) as f32
    }

    fn value_to_string(&self, value: f32, _include_unit: bool) -> String {
        self.clamp_int(value).to_string()
    }

    fn string_to_value(&self, string: &str) -> Option<f32> {
        let value = string.trim().parse::<i32>().ok()?;
        Some(self.clamp_value(value as f32))
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_and_clamping() {
        let division = IntegerParameter::new(FourCC(*b"test"), "Division", 1..=8, 1);
        assert_eq!(division.clamp_value(3.4), 3.0);
        assert_eq!(division.clamp_value(3.6), 4.0);
        assert_eq!(division.clamp_value(0.0), 1.0);
        assert_eq!(division.clamp_value(100.0), 8.0);
        assert_eq!(division.clamp_value(f32::NAN), 1.0);
        assert_eq!(division.normalize_value(8.0), 1.0);
        assert_eq!(division.denormalize_value(0.5), 5.0);
        assert_eq!(division.string_to_value("12"), Some(8.0));
        assert_eq!(division.string_to_value("x"), None);
    }
}
