//! Relation definitions and the descriptors derived from them.
//!
//! A relation is declared once, on the model that owns the reference. The
//! schema derives the reverse side automatically, so every relation can be
//! traversed from both ends:
//!
//! | declared as | forward side | reverse side |
//! |---|---|---|
//! | `ForeignKey` | forward, single | reverse, multiple |
//! | `OneToOne` | forward, single | reverse, single |
//! | `ManyToMany` | symmetrical | symmetrical |

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// How a relation was declared on its owning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Many records reference one target record.
    ForeignKey,
    /// One record references one target record, uniquely.
    OneToOne,
    /// Records on both sides link to any number of records on the other.
    ManyToMany,
}

impl RelationKind {
    /// Check if the owning side stores the reference as a column.
    pub fn has_column(&self) -> bool {
        matches!(self, Self::ForeignKey | Self::OneToOne)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForeignKey => write!(f, "n:1"),
            Self::OneToOne => write!(f, "1:1"),
            Self::ManyToMany => write!(f, "m:n"),
        }
    }
}

/// A relation declared on its owning model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationDef {
    /// Relation name on the owning model.
    pub name: SmolStr,
    /// The model being referenced.
    pub target: SmolStr,
    /// How the relation was declared.
    pub kind: RelationKind,
    /// Name of the reverse relation on the target model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_name: Option<SmolStr>,
}

impl RelationDef {
    /// Create a new relation.
    pub fn new(name: impl Into<SmolStr>, target: impl Into<SmolStr>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind,
            related_name: None,
        }
    }

    /// Create a foreign key relation.
    pub fn foreign_key(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self::new(name, target, RelationKind::ForeignKey)
    }

    /// Create a one-to-one relation.
    pub fn one_to_one(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self::new(name, target, RelationKind::OneToOne)
    }

    /// Create a many-to-many relation.
    pub fn many_to_many(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self::new(name, target, RelationKind::ManyToMany)
    }

    /// Set the reverse relation name.
    pub fn with_related_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.related_name = Some(name.into());
        self
    }

    /// Name of the reverse relation as seen from the target model.
    ///
    /// Defaults to `<owner>` for one-to-one relations and `<owner>_set`
    /// otherwise.
    pub fn reverse_name(&self, owner: &str) -> SmolStr {
        if let Some(ref name) = self.related_name {
            return name.clone();
        }
        match self.kind {
            RelationKind::OneToOne => SmolStr::new(owner),
            RelationKind::ForeignKey | RelationKind::ManyToMany => {
                SmolStr::new(format!("{}_set", owner))
            }
        }
    }
}

/// Which model stores the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The reference lives on the model being described.
    Forward,
    /// The reference lives on the related model.
    Reverse,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

/// How many related records a relation yields per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one related record.
    Single,
    /// An ordered sequence of related records.
    Multiple,
}

impl Cardinality {
    /// Check if this yields a sequence.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Multiple)
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multiple => write!(f, "multiple"),
        }
    }
}

/// A relation as seen from one of its two ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Relation name on `model`.
    pub name: SmolStr,
    /// The model this descriptor was looked up on.
    pub model: SmolStr,
    /// The model on the other end.
    pub related_model: SmolStr,
    /// Which side stores the reference.
    pub direction: Direction,
    /// How many related records each record yields.
    pub cardinality: Cardinality,
    /// Whether this is a many-to-many relation.
    pub symmetrical: bool,
    /// For reverse relations, the name of the relation on `related_model`
    /// that points back at `model`.
    pub back_reference: Option<SmolStr>,
}

impl RelationDescriptor {
    /// Describe the owning side of a declared relation.
    pub fn forward(owner: impl Into<SmolStr>, def: &RelationDef) -> Self {
        let symmetrical = def.kind == RelationKind::ManyToMany;
        Self {
            name: def.name.clone(),
            model: owner.into(),
            related_model: def.target.clone(),
            direction: Direction::Forward,
            cardinality: if symmetrical {
                Cardinality::Multiple
            } else {
                Cardinality::Single
            },
            symmetrical,
            back_reference: None,
        }
    }

    /// Describe the target side of a declared relation.
    pub fn reverse(owner: &str, def: &RelationDef) -> Self {
        Self {
            name: def.reverse_name(owner),
            model: def.target.clone(),
            related_model: SmolStr::new(owner),
            direction: Direction::Reverse,
            cardinality: match def.kind {
                RelationKind::OneToOne => Cardinality::Single,
                RelationKind::ForeignKey | RelationKind::ManyToMany => Cardinality::Multiple,
            },
            symmetrical: def.kind == RelationKind::ManyToMany,
            back_reference: Some(def.name.clone()),
        }
    }

    /// Short human-readable kind, e.g. `reverse multiple`.
    pub fn kind_label(&self) -> String {
        if self.symmetrical {
            "many-to-many".to_string()
        } else {
            format!("{} {}", self.direction, self.cardinality)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_reverse_names() {
        assert_eq!(
            RelationDef::foreign_key("owner", "owner").reverse_name("widget"),
            "widget_set"
        );
        assert_eq!(
            RelationDef::one_to_one("widget", "widget").reverse_name("thing"),
            "thing"
        );
        assert_eq!(
            RelationDef::many_to_many("widget_set", "widget").reverse_name("category"),
            "category_set"
        );
    }

    #[test]
    fn test_related_name_override() {
        let def = RelationDef::foreign_key("owner", "owner").with_related_name("widgets");
        assert_eq!(def.reverse_name("widget"), "widgets");
    }

    #[test]
    fn test_foreign_key_descriptors() {
        let def = RelationDef::foreign_key("owner", "owner");

        let forward = RelationDescriptor::forward("widget", &def);
        assert_eq!(forward.direction, Direction::Forward);
        assert_eq!(forward.cardinality, Cardinality::Single);
        assert_eq!(forward.related_model, "owner");
        assert!(forward.back_reference.is_none());

        let reverse = RelationDescriptor::reverse("widget", &def);
        assert_eq!(reverse.name, "widget_set");
        assert_eq!(reverse.model, "owner");
        assert_eq!(reverse.direction, Direction::Reverse);
        assert_eq!(reverse.cardinality, Cardinality::Multiple);
        assert_eq!(reverse.back_reference.as_deref(), Some("owner"));
    }

    #[test]
    fn test_one_to_one_reverse_is_single() {
        let def = RelationDef::one_to_one("widget", "widget");
        let reverse = RelationDescriptor::reverse("thing", &def);
        assert_eq!(reverse.cardinality, Cardinality::Single);
        assert!(!reverse.symmetrical);
    }

    #[test]
    fn test_many_to_many_is_symmetrical_both_ways() {
        let def = RelationDef::many_to_many("widget_set", "widget");
        assert!(RelationDescriptor::forward("category", &def).symmetrical);
        assert!(RelationDescriptor::reverse("category", &def).symmetrical);
        assert_eq!(
            RelationDescriptor::reverse("category", &def).kind_label(),
            "many-to-many"
        );
    }

    #[test]
    fn test_kind_label() {
        let def = RelationDef::foreign_key("owner", "owner");
        assert_eq!(
            RelationDescriptor::reverse("widget", &def).kind_label(),
            "reverse multiple"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RelationKind::ForeignKey.to_string(), "n:1");
        assert_eq!(RelationKind::ManyToMany.to_string(), "m:n");
        assert!(RelationKind::OneToOne.has_column());
        assert!(!RelationKind::ManyToMany.has_column());
    }
}
