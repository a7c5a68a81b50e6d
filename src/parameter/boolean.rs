use four_cc::FourCC;

use super::{Parameter, ParameterType};

// -------------------------------------------------------------------------------------------------

/// A boolean parameter descriptor. Values are stored as plain `0.0` or `1.0` values.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanParameter {
    id: FourCC,
    name: &'static str,
    default: bool,
}

impl BooleanParameter {
    /// Create a new boolean parameter descriptor.
    pub const fn new(id: FourCC, name: &'static str, default: bool) -> Self {
        Self { id, name, default }
    }

    /// Convert a plain value to a boolean.
    pub fn to_bool(&self, value: f32) -> bool {
        if value.is_nan() {
            self.default
        } else {
            value >= 0.5
        }
    }

    /// Convert a boolean to a plain value.
    pub const fn from_bool(value: bool) -> f32 {
        if value {
            1.0
        } else {
            0.0
        }
    }
}

impl Parameter for BooleanParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Boolean
    }

    fn range(&self) -> (f32, f32) {
        (0.0, 1.0)
    }

    fn default_value(&self) -> f32 {
        Self::from_bool(self.default)
    }

    fn clamp_value(&self, value: f32) -> f32 {
        Self::from_bool(self.to_bool(value))
    }

    fn value_to_string(&self, value: f32, _include_unit: bool) -> String {
        if self.to_bool(value) {
            "ON".to_string()
        } else {
            "OFF".to_string()
        }
    }

    fn string_to_value(&self, string: &str) -> Option<f32> {
        let string = string.trim();
        let value = if string.eq_ignore_ascii_case("ON") {
            true
        } else if string.eq_ignore_ascii_case("OFF") {
            false
        } else {
            string.parse::<bool>().ok()?
        };
        Some(Self::from_bool(value))
    }
}

// -------------------------------------------------------------------------------------------------
