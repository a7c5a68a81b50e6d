use std::sync::Arc;

use arc_swap::ArcSwap;
use four_cc::FourCC;

use super::{Parameter, ParameterRegistry};
use crate::Error;

// -------------------------------------------------------------------------------------------------

/// Lock-free parameter value storage, shared between control threads and the real-time thread.
///
/// All values live in a single immutable value list, which gets swapped as a whole. Writers
/// copy the current list, apply their changes and swap in the new list, retrying when another
/// writer swapped meanwhile. Readers load the current list without locking or waiting, so a
/// batch of changes always is seen either completely or not at all.
#[derive(Debug)]
pub struct SharedParameters {
    parameters: &'static [&'static dyn Parameter],
    values: ArcSwap<Vec<f32>>,
}

impl SharedParameters {
    /// Create a new parameter storage for the given descriptors, initialized to their defaults.
    pub fn new(parameters: &'static [&'static dyn Parameter]) -> Self {
        let values = ArcSwap::from_pointee(Self::default_values(parameters));
        Self { parameters, values }
    }

    /// Number of stored parameter values.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// True when no parameters are stored.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Index of the parameter with the given id in the descriptor list.
    pub fn index_of(&self, id: FourCC) -> Option<usize> {
        self.parameters.iter().position(|p| p.id() == id)
    }

    /// Set a new plain value. Values are clamped into the parameter's range.
    pub fn set(&self, id: FourCC, value: f32) -> Result<(), Error> {
        self.set_many(&[(id, value)])
    }

    /// Set a new normalized value in range \[0, 1\].
    pub fn set_normalized(&self, id: FourCC, normalized: f32) -> Result<(), Error> {
        let index = self.checked_index(id)?;
        let value = self.parameters[index].denormalize_value(normalized);
        self.set_many(&[(id, value)])
    }

    /// Set multiple plain values at once. The reader sees either none or all of the changes.
    pub fn set_many(&self, values: &[(FourCC, f32)]) -> Result<(), Error> {
        let indices_and_values = values
            .iter()
            .map(|(id, value)| {
                let index = self.checked_index(*id)?;
                Ok((index, self.parameters[index].clamp_value(*value)))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        self.values.rcu(|current| {
            let mut values = Vec::clone(current);
            for (index, value) in &indices_and_values {
                values[*index] = *value;
            }
            values
        });
        Ok(())
    }

    /// Reset all values to the parameter defaults.
    pub fn reset_to_defaults(&self) {
        self.values
            .store(Arc::new(Self::default_values(self.parameters)));
    }

    /// Copy all values into the given slice, which must be as long as the descriptor list.
    ///
    /// This does not lock or wait. It may release a replaced value list though, when it was
    /// the last user of it.
    pub fn read_into(&self, target: &mut [f32]) {
        debug_assert_eq!(target.len(), self.parameters.len(), "Invalid target length");
        let values = self.values.load();
        for (target, value) in target.iter_mut().zip(values.iter()) {
            *target = *value;
        }
    }

    fn default_values(parameters: &[&'static dyn Parameter]) -> Vec<f32> {
        parameters.iter().map(|p| p.default_value()).collect()
    }

    fn checked_index(&self, id: FourCC) -> Result<usize, Error> {
        self.index_of(id)
            .ok_or_else(|| Error::ParameterError(format!("Unknown parameter: '{id}'")))
    }
}

impl ParameterRegistry for SharedParameters {
    fn parameters(&self) -> &[&'static dyn Parameter] {
        self.parameters
    }

    fn get(&self, id: FourCC) -> Option<f32> {
        let index = self.index_of(id)?;
        self.values.load().get(index).copied()
    }
}

// -------------------------------------------------------------------------------------------------
