//! Engine parameter descriptors and the parameter registry interface.

use std::fmt::Debug;

use four_cc::FourCC;

// -------------------------------------------------------------------------------------------------

/// Describes the type of a [`Parameter`] to e.g. select a proper visual representation in a UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterType {
    /// A continuous floating-point value.
    Float,
    /// A discrete integer value.
    Integer,
    /// A choice from a list of strings (an enum), stored as index.
    Enum { values: &'static [&'static str] },
    /// A boolean toggle, stored as 0 or 1.
    Boolean,
}

// -------------------------------------------------------------------------------------------------

/// Describes a single engine parameter for use in UIs, for automation or for persistence.
///
/// All parameter values are exchanged as plain `f32` values within the parameter's range:
/// integers, enum indices and booleans get rounded by [`Parameter::clamp_value`].
pub trait Parameter: Debug + Send + Sync {
    /// The unique id of the parameter.
    fn id(&self) -> FourCC;

    /// The name of the parameter.
    fn name(&self) -> &'static str;

    /// The parameter type.
    fn parameter_type(&self) -> ParameterType;

    /// The parameter's plain value range as `(min, max)`.
    fn range(&self) -> (f32, f32);

    /// The parameter's plain default value.
    fn default_value(&self) -> f32;

    /// Sanitize the given plain value: clamp it into the parameter's range and quantize it
    /// when the parameter is discrete. NaNs are replaced with the default value.
    fn clamp_value(&self, value: f32) -> f32;

    /// Normalize the given plain value to a 0.0-1.0 range.
    fn normalize_value(&self, value: f32) -> f32 {
        let (min, max) = self.range();
        if max > min {
            ((self.clamp_value(value) - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Denormalize a 0.0-1.0 ranged value to the corresponding plain value.
    fn denormalize_value(&self, normalized: f32) -> f32 {
        let (min, max) = self.range();
        self.clamp_value(min + normalized.clamp(0.0, 1.0) * (max - min))
    }

    /// Convert the given plain value to a string value.
    fn value_to_string(&self, value: f32, include_unit: bool) -> String;

    /// Convert the given string value to a plain value.
    /// Returns `None` when conversion failed, else a valid, clamped plain value.
    fn string_to_value(&self, string: &str) -> Option<f32>;
}

// -------------------------------------------------------------------------------------------------

/// Read access to the current values of a set of parameters, addressed by their ids.
///
/// This is the only way collaborators (UIs, persistence, hosts) inspect parameters: no runtime
/// type inspection of parameter values is needed.
pub trait ParameterRegistry {
    /// All parameter descriptors of the registry.
    fn parameters(&self) -> &[&'static dyn Parameter];

    /// Current plain value of the parameter with the given id.
    fn get(&self, id: FourCC) -> Option<f32>;

    /// Plain value range of the parameter with the given id as `(min, max)`.
    fn range(&self, id: FourCC) -> Option<(f32, f32)> {
        self.parameters()
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.range())
    }
}

// -------------------------------------------------------------------------------------------------

mod float;
pub use float::FloatParameter;

mod integer;
pub use integer::IntegerParameter;

mod r#enum;
pub use r#enum::EnumParameter;

mod boolean;
pub use boolean::BooleanParameter;

mod shared;
pub use shared::SharedParameters;
