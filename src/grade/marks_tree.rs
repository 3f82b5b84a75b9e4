#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use super::{
    criterion::{CriteriaPath, Criterion},
    error::AggregationError,
    map::CriterionMap,
    mark::{Mark, SubMark},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarksTreeRepr", into = "MarksTreeRepr")]
/// A tree of marks, carrying structure only, no weighting information.
///
/// A node is either a [`Mark`] or has at least one named child.
pub enum MarksTree {
    /// A leaf.
    Mark(Mark),
    /// A non-empty set of named subtrees.
    Composite(SubTrees),
}

#[derive(Clone, Debug, PartialEq)]
/// Children of a composite [`MarksTree`]: never empty, keys distinct. Only
/// [`MarksTree::composite`] builds one.
pub struct SubTrees(CriterionMap<MarksTree>);

impl std::ops::Deref for SubTrees {
    type Target = CriterionMap<MarksTree>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MarksTree {
    /// A tree made of a single mark.
    pub fn mark(mark: Mark) -> Self {
        MarksTree::Mark(mark)
    }

    /// A composite tree with the given children, in the given order.
    ///
    /// Fails if there are no children or if a criterion repeats.
    pub fn composite<I, C>(children: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (C, MarksTree)>,
        C: Into<Criterion>,
    {
        let children =
            CriterionMap::try_from_entries(children.into_iter().map(|(c, t)| (c.into(), t)))?;
        if children.is_empty() {
            return Err(AggregationError::InvalidArgument(
                "a composite marks tree needs at least one child".into(),
            ));
        }
        Ok(MarksTree::Composite(SubTrees(children)))
    }

    /// A one-level composite tree whose children are the given marks.
    pub fn from_sub_marks<I>(sub_marks: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = SubMark>,
    {
        Self::composite(
            sub_marks
                .into_iter()
                .map(|s| (s.criterion, MarksTree::Mark(s.mark))),
        )
    }

    /// Returns `true` if this tree is a single mark.
    pub fn is_mark(&self) -> bool {
        matches!(self, MarksTree::Mark(_))
    }

    /// Returns `true` if this tree has children.
    pub fn is_composite(&self) -> bool {
        matches!(self, MarksTree::Composite(_))
    }

    /// The mark at the root, if this tree is a leaf.
    pub fn as_mark(&self) -> Option<&Mark> {
        match self {
            MarksTree::Mark(mark) => Some(mark),
            MarksTree::Composite(_) => None,
        }
    }

    /// Children of the root, if any.
    pub fn children(&self) -> Option<&CriterionMap<MarksTree>> {
        match self {
            MarksTree::Mark(_) => None,
            MarksTree::Composite(children) => Some(&children.0),
        }
    }

    /// Criteria of the root's children, in order; empty for a leaf.
    pub fn criteria(&self) -> Vec<&Criterion> {
        self.children()
            .map(|children| children.keys().collect())
            .unwrap_or_default()
    }

    /// Child subtree for `criterion`.
    pub fn sub_tree(&self, criterion: &Criterion) -> Option<&MarksTree> {
        self.children().and_then(|children| children.get(criterion))
    }

    /// Subtree reached by following `path` from the root.
    pub fn tree_at(&self, path: &CriteriaPath) -> Option<&MarksTree> {
        path.iter()
            .try_fold(self, |tree, criterion| tree.sub_tree(criterion))
    }

    /// Returns `true` if `path` leads to a node of this tree.
    pub fn has_path(&self, path: &CriteriaPath) -> bool {
        self.tree_at(path).is_some()
    }

    /// Mark at the end of `path`, if that node is a leaf.
    pub fn mark_at(&self, path: &CriteriaPath) -> Option<&Mark> {
        self.tree_at(path).and_then(MarksTree::as_mark)
    }

    /// All maximal paths from the root that end on a mark, depth first in
    /// child order. A leaf tree yields only the root path.
    pub fn paths_to_marks(&self) -> Vec<CriteriaPath> {
        match self {
            MarksTree::Mark(_) => vec![CriteriaPath::ROOT],
            MarksTree::Composite(children) => children
                .iter()
                .flat_map(|(criterion, child)| {
                    child
                        .paths_to_marks()
                        .into_iter()
                        .map(|p| p.with_prefix(criterion.clone()))
                })
                .collect(),
        }
    }
}

impl From<Mark> for MarksTree {
    fn from(mark: Mark) -> Self {
        MarksTree::Mark(mark)
    }
}

/// Wire form of a [`MarksTree`]: a mark object, or an ordered array of
/// named subtrees.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MarksTreeRepr {
    /// A leaf.
    Mark(Mark),
    /// Children in insertion order.
    Composite(Vec<SubTreeRepr>),
}

/// One named child in the wire form of a composite tree.
#[derive(Serialize, Deserialize)]
struct SubTreeRepr {
    /// Child key.
    criterion: Criterion,
    /// Child subtree.
    grade:     MarksTree,
}

impl TryFrom<MarksTreeRepr> for MarksTree {
    type Error = AggregationError;

    fn try_from(repr: MarksTreeRepr) -> Result<Self, Self::Error> {
        match repr {
            MarksTreeRepr::Mark(mark) => Ok(MarksTree::Mark(mark)),
            MarksTreeRepr::Composite(children) => {
                MarksTree::composite(children.into_iter().map(|s| (s.criterion, s.grade)))
            }
        }
    }
}

impl From<MarksTree> for MarksTreeRepr {
    fn from(tree: MarksTree) -> Self {
        match tree {
            MarksTree::Mark(mark) => MarksTreeRepr::Mark(mark),
            MarksTree::Composite(children) => MarksTreeRepr::Composite(
                children
                    .0
                    .into_iter()
                    .map(|(criterion, grade)| SubTreeRepr { criterion, grade })
                    .collect(),
            ),
        }
    }
}
