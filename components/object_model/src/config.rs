//! Storage tunables.
//!
//! Every capacity and threshold that decides when an object moves between
//! fast and dictionary storage lives here, so embedders can adjust them
//! without touching the algorithms.

use serde::Deserialize;
use thiserror::Error;

use crate::attributes::MAX_CAPACITY_OF_PROPERTIES;
use crate::hash_table::MIN_SIZE;

/// Errors produced while loading a [`StorageConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or has fields of the wrong type.
    #[error("failed to parse storage config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field is outside its legal range.
    #[error("invalid storage config: `{field}` must be {requirement} (got {value})")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Human readable constraint
        requirement: &'static str,
        /// Value that was supplied
        value: u32,
    },
}

/// Capacities and thresholds for property and element storage.
///
/// # Example
///
/// ```
/// use object_model::StorageConfig;
///
/// let config = StorageConfig::from_json(r#"{ "inlined_properties": 8 }"#).unwrap();
/// assert_eq!(config.inlined_properties, 8);
/// assert_eq!(config.max_out_of_line(), 1016);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Number of property slots stored inside the object itself
    pub inlined_properties: u32,
    /// Length of the first out-of-line property array
    pub min_properties_length: u32,
    /// Slot count of a freshly created dictionary
    pub dictionary_capacity: u32,
    /// Smallest fast element array ever allocated
    pub min_elements_length: u32,
    /// Capacity from which the relative gap check applies
    pub element_min_gap: u32,
    /// Absolute gap beyond which elements go to a dictionary
    pub element_max_gap: u32,
    /// Relative growth factor tolerated once past `element_min_gap`
    pub fast_elements_factor: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            inlined_properties: 4,
            min_properties_length: 4,
            dictionary_capacity: 128,
            min_elements_length: 3,
            element_min_gap: 256,
            element_max_gap: 1024,
            fast_elements_factor: 3,
        }
    }
}

impl StorageConfig {
    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: StorageConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field fits the packed attribute layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inlined_properties == 0 || self.inlined_properties >= MAX_CAPACITY_OF_PROPERTIES {
            return Err(ConfigError::Invalid {
                field: "inlined_properties",
                requirement: "between 1 and 1023",
                value: self.inlined_properties,
            });
        }
        if self.min_properties_length == 0 || self.min_properties_length > self.max_out_of_line() {
            return Err(ConfigError::Invalid {
                field: "min_properties_length",
                requirement: "non-zero and within the out-of-line capacity",
                value: self.min_properties_length,
            });
        }
        if !self.dictionary_capacity.is_power_of_two() || (self.dictionary_capacity as usize) < MIN_SIZE {
            return Err(ConfigError::Invalid {
                field: "dictionary_capacity",
                requirement: "a power of two of at least 4",
                value: self.dictionary_capacity,
            });
        }
        if self.min_elements_length == 0 {
            return Err(ConfigError::Invalid {
                field: "min_elements_length",
                requirement: "non-zero",
                value: self.min_elements_length,
            });
        }
        if self.fast_elements_factor == 0 {
            return Err(ConfigError::Invalid {
                field: "fast_elements_factor",
                requirement: "non-zero",
                value: self.fast_elements_factor,
            });
        }
        Ok(())
    }

    /// Maximum length of the out-of-line property array.
    pub fn max_out_of_line(&self) -> u32 {
        MAX_CAPACITY_OF_PROPERTIES.saturating_sub(self.inlined_properties)
    }

    /// Next out-of-line property array length: doubles, capped at the maximum.
    pub fn compute_property_capacity(&self, old_capacity: u32) -> u32 {
        old_capacity
            .saturating_mul(2)
            .max(self.min_properties_length)
            .min(self.max_out_of_line())
    }

    /// Next fast element array length: grows by half, never below the minimum.
    pub fn compute_element_capacity(&self, old_capacity: u32) -> u32 {
        let new_capacity = old_capacity.saturating_add(old_capacity >> 1);
        new_capacity.max(self.min_elements_length)
    }

    /// Whether writing `index` into a fast element array of `capacity` should
    /// switch the elements to a dictionary instead of growing the array.
    pub fn should_elements_go_to_dictionary(&self, capacity: u32, index: u32) -> bool {
        if index < capacity {
            return false;
        }
        if index - capacity > self.element_max_gap {
            return true;
        }
        if capacity >= self.element_min_gap {
            return u64::from(index) > u64::from(capacity) * u64::from(self.fast_elements_factor);
        }
        false
    }
}
