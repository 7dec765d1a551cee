//! In-memory representation of a parsed tag query.
//!
//! The parser that builds these values, and the FUSE-like dispatcher that
//! consumes the results downstream, are both out of scope for this crate —
//! see the crate-level docs. What lives here is deliberately just owned
//! data: the [`RdsCoordinator`](crate::coordinator::RdsCoordinator) and
//! friends only ever read it.
//!
//! The original implementation wires atoms together with `next`/`related`/
//! `negated` pointers. Here each [`Conjunction`] is an owned `Vec` of chain
//! positions, each carrying its own `related` siblings and its own `negated`
//! siblings, which removes the pointer graph while preserving traversal
//! order exactly (main chain index order, then related-vector order, then
//! negated-vector order).

/// The comparison operator of a [`TagAtom::Triple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Exact match.
    Eq,
    /// Substring match (`LIKE '%...%'`).
    Contains,
    /// Greater-than.
    Gt,
    /// Less-than.
    Lt,
}

impl Op {
    /// The token used in the canonical subquery grammar (`eq`, `inc`, `gt`, `lt`).
    pub fn canonical_token(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Contains => "inc",
            Op::Gt => "gt",
            Op::Lt => "lt",
        }
    }
}

/// A single tag assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAtom {
    /// Direct lookup by tag id. Never canonicalized; callers must resolve
    /// this to a [`TagAtom::ByName`] before the atom reaches
    /// [`crate::canonical::canonicalize`].
    ById {
        /// The tag's primary key in the tag catalog (out of scope here).
        tag_id: i64,
    },
    /// A plain tag, referenced by name.
    ByName {
        /// The tag name.
        tag: String,
    },
    /// A namespaced key/value assertion with an operator.
    Triple {
        /// The tag namespace (e.g. `author`).
        namespace: String,
        /// The key within the namespace (e.g. `name`).
        key: String,
        /// The comparison operator.
        op: Op,
        /// The literal value to compare against.
        value: String,
    },
}

/// One position in a [`Conjunction`]'s main chain: an atom plus the
/// reasoner-expanded alternatives that satisfy it just as well.
///
/// Both the head of the chain and every negated atom are `related`-bearing
/// in this same shape, so this type is reused for both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomWithRelated {
    /// The atom itself.
    pub atom: TagAtom,
    /// Alternative tags OR-joined with `atom` (reasoner expansion): any one
    /// of these satisfies this chain position just as well as `atom` does.
    pub related: Vec<TagAtom>,
}

impl Default for TagAtom {
    fn default() -> Self {
        TagAtom::ByName {
            tag: String::new(),
        }
    }
}

impl AtomWithRelated {
    /// Construct a node with no related siblings.
    pub fn new(atom: TagAtom) -> Self {
        Self {
            atom,
            related: Vec::new(),
        }
    }

    /// Construct a node with related siblings.
    pub fn with_related(atom: TagAtom, related: Vec<TagAtom>) -> Self {
        Self { atom, related }
    }

    /// `atom` followed by every entry of `related`, in order — the OR-chain
    /// that one chain position expands to.
    pub fn alternatives(&self) -> impl Iterator<Item = &TagAtom> {
        std::iter::once(&self.atom).chain(self.related.iter())
    }
}

/// A non-empty AND-chain of [`TagAtom`]s, with per-position negations.
///
/// `chain[0]` is the head; `chain[1..]` are the remaining ANDed atoms.
/// `negated[i]` holds the atoms that must NOT match for chain position `i`
/// (a NOT-joined sibling list); it is parallel to `chain`, i.e.
/// `negated.len() == chain.len()`, though most positions will have an empty
/// `Vec`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conjunction {
    /// The main AND chain. Non-empty for any conjunction that reached this
    /// crate through the normal `prepare` path.
    pub chain: Vec<AtomWithRelated>,
    /// Negated atoms, one list per `chain` position.
    pub negated: Vec<Vec<AtomWithRelated>>,
}

impl Conjunction {
    /// Build a conjunction from just its main chain, with no negations.
    pub fn from_chain(chain: Vec<AtomWithRelated>) -> Self {
        let negated = chain.iter().map(|_| Vec::new()).collect();
        Self { chain, negated }
    }

    /// The head of the chain, if any (conjunctions are expected to be
    /// non-empty, but `RdsBuilder` defensively tolerates an empty one per
    /// the source's own behavior).
    pub fn head(&self) -> Option<&AtomWithRelated> {
        self.chain.first()
    }
}

/// An ordered set of [`Conjunction`]s; the semantics is set union.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Disjunction {
    /// The conjunctions, in the order they should be resolved and in the
    /// order their resulting ids appear in the fingerprint.
    pub conjunctions: Vec<Conjunction>,
}

impl Disjunction {
    /// Build a disjunction from a list of conjunctions.
    pub fn new(conjunctions: Vec<Conjunction>) -> Self {
        Self { conjunctions }
    }

    /// True if there is nothing to resolve.
    pub fn is_empty(&self) -> bool {
        self.conjunctions.is_empty()
    }
}

/// A resolved object reference, as delivered to the FUSE-like dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileHandle {
    /// The object's inode.
    pub inode: i64,
    /// The object's name within its tag-expression "directory".
    pub name: String,
}
