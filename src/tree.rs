use crate::error::{InsertError, MatchError};
use crate::params::Params;
use crate::path::{self, PARAM, WILDCARD};

use std::fmt;

/// The structural role of a node, decided by the first character of its segment.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum NodeKind {
    /// A literal segment, matched by equality.
    Static,
    /// `:name`, matches exactly one segment.
    Param,
    /// `*name`, matches the rest of the path.
    Wildcard,
}

impl NodeKind {
    fn of(segment: &str) -> NodeKind {
        if segment.starts_with(PARAM) {
            NodeKind::Param
        } else if segment.starts_with(WILDCARD) {
            NodeKind::Wildcard
        } else {
            NodeKind::Static
        }
    }
}

/// A node of a segment trie.
///
/// Every node matches one path segment at its depth. A route tree stores
/// the route handler as the value of the node its pattern ends at.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = sprig::Node::new();
/// tree.insert("/users/:id", "user")?;
/// tree.insert("/files/*path", "file")?;
///
/// let matched = tree.at("/users/42")?;
/// assert_eq!(*matched.value, "user");
/// assert_eq!(matched.params.get("id"), Some("42"));
///
/// let matched = tree.at("/files/a/b.txt")?;
/// assert_eq!(*matched.value, "file");
/// assert_eq!(matched.params.get("path"), Some("a/b.txt"));
/// # Ok(())
/// # }
/// ```
pub struct Node<T> {
    segment: String,
    kind: NodeKind,
    // the full pattern from the root to this node, as first registered
    pattern: String,
    children: Vec<Node<T>>,
    value: Option<T>,
}

/// A successful match, consisting of the stored value and the matched parameters.
#[derive(Debug)]
pub struct Match<'n, V> {
    /// The value stored under the matched node.
    pub value: V,
    /// The route parameters.
    pub params: Params,
    /// The pattern of the matched node.
    pub pattern: &'n str,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node {
            segment: String::new(),
            kind: NodeKind::Static,
            pattern: String::new(),
            children: Vec::new(),
            value: None,
        }
    }
}

impl<T> Node<T> {
    /// Creates an empty tree. The returned node is the root sentinel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value for the given pattern, replacing any previous value.
    pub fn insert(&mut self, pattern: impl AsRef<str>, value: T) -> Result<(), InsertError> {
        self.node_mut(pattern.as_ref())?.value = Some(value);
        Ok(())
    }

    /// Returns the value stored for `pattern`, inserting one with `f` if there
    /// is none yet.
    pub(crate) fn value_or_insert_with(
        &mut self,
        pattern: &str,
        f: impl FnOnce() -> T,
    ) -> Result<&mut T, InsertError> {
        Ok(self.node_mut(pattern)?.value.get_or_insert_with(f))
    }

    // Walks the tree along `pattern`, creating missing nodes, and returns the
    // node the pattern ends at.
    fn node_mut(&mut self, pattern: &str) -> Result<&mut Node<T>, InsertError> {
        if path::has_trailing_segments(pattern) {
            return Err(InsertError::InvalidCatchAll);
        }

        let mut current = self;

        for segment in path::segments(pattern) {
            let kind = NodeKind::of(segment);
            let i = match current.position_for_insert(segment, kind) {
                Some(i) => {
                    let child = &current.children[i];
                    if child.segment != segment {
                        warn!(
                            "'{}' in route '{}' is already registered as '{}', keeping '{}'",
                            segment, pattern, child.pattern, child.segment
                        );
                    }
                    i
                }
                None => {
                    // built from the canonical segments of the ancestors
                    let pattern = format!("{}/{}", current.pattern, segment);
                    current.children.push(Node {
                        segment: segment.to_owned(),
                        kind,
                        pattern,
                        children: Vec::new(),
                        value: None,
                    });
                    current.children.len() - 1
                }
            };

            current = &mut current.children[i];
        }

        Ok(current)
    }

    // A static segment only shares an identical static child, while a
    // parameter or wildcard shares the single child of its kind.
    fn position_for_insert(&self, segment: &str, kind: NodeKind) -> Option<usize> {
        self.children.iter().position(|child| match kind {
            NodeKind::Static => child.kind == NodeKind::Static && child.segment == segment,
            _ => child.kind == kind,
        })
    }

    // Selects the child matching one request path segment: an identical
    // static child first, otherwise the first parameter or wildcard child.
    fn match_child(&self, segment: &str) -> Option<&Node<T>> {
        self.children
            .iter()
            .find(|child| child.kind == NodeKind::Static && child.segment == segment)
            .or_else(|| {
                self.children
                    .iter()
                    .find(|child| child.kind != NodeKind::Static)
            })
    }

    /// Walks the tree along the given path segments.
    ///
    /// Returns the node the path ends at, if any, along with every node
    /// visited from the root, root included. The trace is returned even when
    /// the walk fails part way.
    pub(crate) fn search<'n>(
        &'n self,
        segments: &[&str],
    ) -> (Option<&'n Node<T>>, Vec<&'n Node<T>>) {
        let mut current = self;
        let mut trace = vec![self];

        for segment in segments {
            let next = match current.match_child(segment) {
                Some(next) => next,
                None => return (None, trace),
            };

            trace.push(next);

            if next.kind == NodeKind::Wildcard {
                return (Some(next), trace);
            }

            current = next;
        }

        (Some(current), trace)
    }

    /// Returns the values of every node on the path, root to leaf.
    pub fn trace<'n>(&'n self, path: &str) -> impl Iterator<Item = &'n T> + 'n {
        self.trace_segments(&path::segments(path))
    }

    pub(crate) fn trace_segments<'n>(
        &'n self,
        segments: &[&str],
    ) -> impl Iterator<Item = &'n T> + 'n {
        let (_, trace) = self.search(segments);
        trace.into_iter().filter_map(|node| node.value.as_ref())
    }

    /// Tries to find a value in the tree matching the given path.
    pub fn at<'n>(&'n self, path: &str) -> Result<Match<'n, &'n T>, MatchError> {
        self.at_segments(&path::segments(path))
    }

    // Like `at`, on a path that is already split into segments.
    pub(crate) fn at_segments<'n>(
        &'n self,
        segments: &[&str],
    ) -> Result<Match<'n, &'n T>, MatchError> {
        match self.search(segments) {
            (Some(node), _) => match node.value {
                Some(ref value) => Ok(Match {
                    value,
                    params: node.params(segments),
                    pattern: node.pattern(),
                }),
                None => Err(MatchError::NotFound),
            },
            (None, _) => Err(MatchError::NotFound),
        }
    }

    /// Tries to find a value in the tree matching the given path, and returns a mutable
    /// reference to it.
    pub fn at_mut<'n>(&'n mut self, path: &str) -> Result<Match<'n, &'n mut T>, MatchError> {
        let segments = path::segments(path);

        let pattern = match self.search(&segments) {
            (Some(node), _) if node.value.is_some() => node.pattern.clone(),
            _ => return Err(MatchError::NotFound),
        };

        // follow the stored pattern of the matched node back down
        let mut current = self;
        for segment in path::segments(&pattern) {
            let i = current
                .children
                .iter()
                .position(|child| child.segment == segment)
                .ok_or(MatchError::NotFound)?;
            current = &mut current.children[i];
        }

        let params = current.params(&segments);
        match current.value {
            Some(ref mut value) => Ok(Match {
                value,
                params,
                pattern: &current.pattern,
            }),
            None => Err(MatchError::NotFound),
        }
    }

    // Rebuilds the parameters of a match from the stored pattern of this
    // node. Pattern segments line up with the path segments that matched it.
    fn params(&self, segments: &[&str]) -> Params {
        let mut params = Params::new();

        for (i, part) in path::segments(&self.pattern).into_iter().enumerate() {
            if let Some(name) = part.strip_prefix(PARAM) {
                if let Some(value) = segments.get(i) {
                    params.push(name, *value);
                }
            } else if let Some(name) = part.strip_prefix(WILDCARD) {
                if !name.is_empty() {
                    params.push(name, segments.get(i..).unwrap_or_default().join("/"));
                }
                break;
            }
        }

        params
    }

    /// The pattern this node was created for, e.g. `/users/:id`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The value stored at this node.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("segment", &self.segment)
            .field("kind", &self.kind)
            .field("pattern", &self.pattern)
            .field("has_value", &self.value.is_some())
            .field("children", &self.children)
            .finish()
    }
}
