//! Ordering of loaded records.

use std::fmt;

use smol_str::SmolStr;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// Order by specification for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    /// The field to order by.
    pub field: SmolStr,
    /// The sort order.
    pub order: SortOrder,
}

impl OrderByField {
    /// Create a new order by field.
    pub fn new(field: impl Into<SmolStr>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Create an ascending order.
    pub fn asc(field: impl Into<SmolStr>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Create a descending order.
    pub fn desc(field: impl Into<SmolStr>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

impl From<&str> for OrderByField {
    /// `"size"` sorts ascending, `"-size"` descending.
    fn from(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(spec),
        }
    }
}

impl fmt::Display for OrderByField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_prefix() {
        assert_eq!(OrderByField::from("size"), OrderByField::asc("size"));
        assert_eq!(OrderByField::from("-size"), OrderByField::desc("size"));
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderByField::desc("name").to_string(), "name DESC");
    }
}
