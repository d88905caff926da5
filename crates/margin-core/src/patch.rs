//! # Patch Module
//!
//! `Patch<T>` marks a field of a sparse update as either left alone or set.
//!
//! ## Why Not `Option<T>`?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON body                         Option<Option<String>>   Patch       │
//! │  ───────────────────────────────   ──────────────────────   ──────────  │
//! │  { }                               None                     Unset       │
//! │  { "description": null }           Some(None)               Set(None)   │
//! │  { "description": "PLA vase" }     Some(Some(..))           Set(Some)   │
//! │                                                                         │
//! │  A field sent with its current value is still Set: the reconciler      │
//! │  sees "the caller touched printing_cost" and recalculates.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serde Contract
//! Every `Patch` field must carry `#[serde(default)]` so an absent key
//! deserializes to `Unset`, and `skip_serializing_if = "Patch::is_unset"` so
//! `Unset` never reaches the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single field of a sparse update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// The caller did not mention this field.
    Unset,
    /// The caller supplied a value.
    Set(T),
}

impl<T> Patch<T> {
    /// Returns true when the field was not mentioned.
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    /// Returns true when the field was supplied.
    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    /// Borrows the supplied value.
    #[inline]
    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Set(value) => Patch::Set(value),
        }
    }

    /// Converts into an `Option`, losing the distinction between unset and `None`.
    #[inline]
    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Unset => None,
            Patch::Set(value) => Some(value),
        }
    }

    /// Borrowing variant of [`Patch::into_option`].
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.as_ref().into_option()
    }

    /// Maps the supplied value, leaving `Unset` alone.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }

    /// Returns the supplied value or `current`.
    #[inline]
    pub fn resolve(self, current: T) -> T {
        match self {
            Patch::Unset => current,
            Patch::Set(value) => value,
        }
    }

    /// Overwrites `target` when the field was supplied.
    #[inline]
    pub fn apply(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            None => Patch::Unset,
            Some(value) => Patch::Set(value),
        }
    }
}

/// A present key always means `Set`, including an explicit `null` when `T`
/// is itself an `Option`.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Unset => serializer.serialize_none(),
            Patch::Set(value) => value.serialize(serializer),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
