use std::str::FromStr;

use four_cc::FourCC;
use strum::VariantArray;

use super::{Parameter, ParameterType};

// -------------------------------------------------------------------------------------------------

/// An enum parameter descriptor. Values are stored as plain variant indices.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumParameter {
    id: FourCC,
    name: &'static str,
    values: &'static [&'static str],
    default_index: usize,
}

impl EnumParameter {
    /// Create a new enum descriptor from the given variant names (usually `strum::VariantNames`).
    pub const fn new(
        id: FourCC,
        name: &'static str,
        values: &'static [&'static str],
        default_index: usize,
    ) -> Self {
        assert!(!values.is_empty(), "Expecting at least one enum value");
        assert!(
            default_index < values.len(),
            "Invalid parameter default value"
        );
        Self {
            id,
            name,
            values,
            default_index,
        }
    }

    pub fn values(&self) -> &'static [&'static str] {
        self.values
    }

    /// Sanitize and convert a plain float value to a variant index.
    pub fn clamp_index(&self, value: f32) -> usize {
        if value.is_nan() {
            self.default_index
        } else {
            value.round().clamp(0.0, (self.values.len() - 1) as f32) as usize
        }
    }

    /// Convert a plain float value to the given enum type, which must list its variants in the
    /// same order as the descriptor's values.
    pub fn to_variant<E: VariantArray + Copy>(&self, value: f32) -> E {
        debug_assert_eq!(E::VARIANTS.len(), self.values.len());
        let index = self.clamp_index(value).min(E::VARIANTS.len() - 1);
        E::VARIANTS[index]
    }

    /// Convert an enum variant to the plain float value.
    pub fn from_variant<E: VariantArray + PartialEq>(&self, variant: E) -> f32 {
        E::VARIANTS
            .iter()
            .position(|v| *v == variant)
            .unwrap_or(self.default_index) as f32
    }

    /// Parse a variant from the given display string.
    pub fn parse_variant<E: FromStr + VariantArray + PartialEq>(&self, string: &str) -> Option<f32> {
        let variant = E::from_str(string.trim()).ok()?;
        Some(self.from_variant(variant))
    }
}

impl Parameter for EnumParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Enum {
            values: self.values,
        }
    }

    fn range(&self) -> (f32, f32) {
        (0.0, (self.values.len() - 1) as f32)
    }

    fn default_value(&self) -> f32 {
        self.default_index as f32
    }

    fn clamp_value(&self, value: f32) -> f32 {
        self.clamp_index(value) as f32
    }

    fn value_to_string(&self, value: f32, _include_unit: bool) -> String {
        self.values[self.clamp_index(value)].to_string()
    }

    fn string_to_value(&self, string: &str) -> Option<f32> {
        let string = string.trim();
        self.values
            .iter()
            .position(|v| v.eq_ignore_ascii_case(string))
            .map(|index| index as f32)
    }
}

// -------------------------------------------------------------------------------------------------
