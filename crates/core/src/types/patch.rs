//! Partial-update field values.
//!
//! A field of type `Patch<T>` in an update request is either left untouched
//! (`Patch::Keep`, the field was absent) or overwritten (`Patch::Set`). Mark
//! such fields `#[serde(default)]` so an absent key deserializes to `Keep`.
//!
//! For nullable columns use `Patch<Option<T>>`: an explicit JSON `null`
//! becomes `Set(None)` and clears the value, which a bare `Option<T>` cannot
//! distinguish from an absent key.

use serde::{Deserialize, Deserializer};

/// A field in a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Leave the current value as is.
    #[default]
    Keep,
    /// Replace the current value.
    Set(T),
}

impl<T> Patch<T> {
    /// Whether this patch overwrites the value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Write the new value into `target` if one was supplied.
    ///
    /// Returns `true` when `target` was overwritten.
    pub fn apply_to(self, target: &mut T) -> bool {
        match self {
            Self::Keep => false,
            Self::Set(value) => {
                *target = value;
                true
            }
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::Set)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        phone: Patch<Option<String>>,
    }

    #[test]
    fn test_absent_fields_are_kept() {
        let update: Update = serde_json::from_str("{}").unwrap();
        assert_eq!(update.name, Patch::Keep);
        assert_eq!(update.phone, Patch::Keep);
    }

    #[test]
    fn test_null_clears_nullable_field() {
        let update: Update = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(update.phone, Patch::Set(None));
    }

    #[test]
    fn test_null_rejected_for_required_field() {
        assert!(serde_json::from_str::<Update>(r#"{"name": null}"#).is_err());
    }

    #[test]
    fn test_apply_to() {
        let mut name = "old".to_owned();
        assert!(!Patch::Keep.apply_to(&mut name));
        assert_eq!(name, "old");
        assert!(Patch::Set("new".to_owned()).apply_to(&mut name));
        assert_eq!(name, "new");
    }
}
