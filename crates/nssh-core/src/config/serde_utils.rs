//! Shared serde helpers
//!
//! The directory API sends `null` for empty objects, maps and strings in
//! several places; these helpers fold that into the type's default.

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
