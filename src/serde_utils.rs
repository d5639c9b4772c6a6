//! Serde helpers shared by request types.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be absent, `null`, or set.
///
/// Pair with `#[serde(default)]` so an absent field stays `None`:
///
/// - missing → `None`
/// - `null` → `Some(None)`
/// - value → `Some(Some(value))`
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default, deserialize_with = "crate::serde_utils::nullable")]
///     description: Option<Option<String>>,
/// }
/// ```
pub fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
