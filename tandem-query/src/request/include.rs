//! Prefetch specifications for eager loading relations.

use smol_str::SmolStr;
use tandem_schema::Cardinality;

use super::LoadRequest;

/// How a prefetched relation is matched to its parent records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchKind {
    /// The parent holds the related record's id in a column named after the relation.
    Forward,
    /// Related records hold the parent's id in `back_reference`.
    Reverse {
        /// Column on the related model that points back at the parent.
        back_reference: SmolStr,
        /// Whether each parent gets one related record or a sequence.
        cardinality: Cardinality,
    },
    /// Parents and related records are linked through a link table.
    ManyToMany,
}

impl PrefetchKind {
    /// Cardinality of the attached slot.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::Forward => Cardinality::Single,
            Self::Reverse { cardinality, .. } => *cardinality,
            Self::ManyToMany => Cardinality::Multiple,
        }
    }
}

/// A relation to load in a separate batch query, with the request used to
/// load (and further shape) the related records.
#[derive(Debug, Clone)]
pub struct Prefetch {
    /// Name of the relation on the parent model.
    pub name: SmolStr,
    /// How related records are matched to parents.
    pub kind: PrefetchKind,
    /// Request for the related records; its own prefetches load recursively.
    pub request: LoadRequest,
}

impl Prefetch {
    /// Create a new prefetch.
    pub fn new(name: impl Into<SmolStr>, kind: PrefetchKind, request: LoadRequest) -> Self {
        Self {
            name: name.into(),
            kind,
            request,
        }
    }

    /// Depth of the prefetch tree rooted here, counting this level.
    pub fn depth(&self) -> usize {
        1 + self
            .request
            .prefetches()
            .map(Prefetch::depth)
            .max()
            .unwrap_or(0)
    }
}
