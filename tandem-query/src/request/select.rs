//! Field selections: which columns a load returns.

use indexmap::IndexSet;
use smol_str::SmolStr;

/// Field selection mode.
///
/// Restricting is a union: restricting to `a` and then to `b` selects both,
/// in either order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelection {
    /// Select all fields.
    #[default]
    All,
    /// Select only these fields (the primary key is always loaded).
    Only(IndexSet<SmolStr>),
}

impl FieldSelection {
    /// Create a selection of exactly these fields.
    pub fn only(fields: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        Self::Only(fields.into_iter().map(Into::into).collect())
    }

    /// Add fields to the selection.
    pub fn include(mut self, fields: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        match &mut self {
            Self::All => return Self::only(fields),
            Self::Only(selected) => selected.extend(fields.into_iter().map(Into::into)),
        }
        self
    }

    /// Union of two selections. `All` absorbs any restriction.
    pub fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::Only(mut fields), Self::Only(more)) => {
                fields.extend(more);
                Self::Only(fields)
            }
            _ => Self::All,
        }
    }

    /// Check if a field is included in this selection.
    pub fn includes(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(fields) => fields.contains(field),
        }
    }

    /// Check if this is an "all" selection.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Get the explicitly selected fields, if restricted.
    pub fn selected_fields(&self) -> Option<&IndexSet<SmolStr>> {
        match self {
            Self::All => None,
            Self::Only(fields) => Some(fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_includes_everything() {
        let selection = FieldSelection::All;
        assert!(selection.is_all());
        assert!(selection.includes("name"));
        assert!(selection.selected_fields().is_none());
    }

    #[test]
    fn test_include_restricts_then_unions() {
        let selection = FieldSelection::All.include(["name"]).include(["other"]);
        assert!(!selection.is_all());
        assert!(selection.includes("name"));
        assert!(selection.includes("other"));
        assert!(!selection.includes("owner"));
    }

    #[test]
    fn test_include_is_order_independent() {
        let ab = FieldSelection::All.include(["a"]).include(["b"]);
        let ba = FieldSelection::All.include(["b"]).include(["a"]);
        assert_eq!(
            ab.selected_fields().map(|f| f.len()),
            ba.selected_fields().map(|f| f.len())
        );
        assert!(["a", "b"].iter().all(|f| ab.includes(f) && ba.includes(f)));
    }

    #[test]
    fn test_union() {
        let union = FieldSelection::only(["a"]).union(FieldSelection::only(["b", "a"]));
        assert_eq!(union.selected_fields().map(|f| f.len()), Some(2));
        assert!(FieldSelection::only(["a"]).union(FieldSelection::All).is_all());
        assert!(FieldSelection::All.union(FieldSelection::only(["a"])).is_all());
    }

    #[test]
    fn test_include_is_idempotent() {
        let selection = FieldSelection::only(["name"]).include(["name"]);
        assert_eq!(selection.selected_fields().map(|f| f.len()), Some(1));
    }
}
