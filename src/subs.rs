//! Types dealing with the substitutions table.

use crate::ast::Node;
use std::fmt;
use std::iter::FromIterator;

/// A component that may be the target of a later back reference, along with
/// the size and height of its tree. Those are computed once on insertion so
/// that expanding a back reference can be charged against the decoder's
/// budgets without walking the tree again.
#[doc(hidden)]
#[derive(Clone, PartialEq, Eq)]
pub struct Substitutable {
    node: Node,
    weight: usize,
    depth: usize,
}

impl Substitutable {
    /// Wrap a freshly parsed component.
    pub fn new(node: Node) -> Substitutable {
        let weight = node.weight();
        let depth = node.depth();
        Substitutable {
            node,
            weight,
            depth,
        }
    }

    /// The substitutable component itself.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Number of nodes a copy of this component adds to the tree.
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Height of this component's tree.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Debug for Substitutable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.node, f)
    }
}

/// The table of substitutable components that we have parsed thus far, and for
/// which there are potential back-references.
///
/// Entries are never removed except for the trailing component of a
/// `<nested-name>`, which is popped again once the whole name is known, and
/// the arguments of a conversion operator template that were first read as
/// those of a template template parameter.
#[doc(hidden)]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable(Vec<Substitutable>);

impl fmt::Debug for SubstitutionTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad("SubstitutionTable ")?;
        f.debug_map().entries(self.0.iter().enumerate()).finish()
    }
}

impl FromIterator<Node> for SubstitutionTable {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        SubstitutionTable(iter.into_iter().map(Substitutable::new).collect())
    }
}

impl SubstitutionTable {
    /// Construct a new `SubstitutionTable`.
    pub fn new() -> SubstitutionTable {
        Default::default()
    }

    /// Insert a freshly-parsed substitutable component into the table and
    /// return the index at which it now lives.
    pub fn insert(&mut self, node: Node) -> usize {
        let idx = self.0.len();
        log!("SubstitutionTable::insert @ {}: {:?}", idx, node);
        self.0.push(Substitutable::new(node));
        idx
    }

    /// Remove the most recently inserted component.
    pub fn pop(&mut self) -> Option<Node> {
        let popped = self.0.pop().map(|s| s.node);
        log!("SubstitutionTable::pop @ {}: {:?}", self.0.len(), popped);
        popped
    }

    /// Drop every entry from index `len` on.
    pub fn truncate(&mut self, len: usize) {
        if len < self.0.len() {
            log!("Dropping substitutions from {}", len);
        }
        self.0.truncate(len);
    }

    /// The entry at the given index, if any.
    pub fn get(&self, idx: usize) -> Option<&Substitutable> {
        self.0.get(idx)
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
