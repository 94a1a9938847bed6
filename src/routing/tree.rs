//! Per-method routing tree.
//!
//! # Responsibilities
//! - Insert compiled route patterns segment by segment
//! - Resolve a request path to the stored value and its parameters
//!
//! # Data Flow
//! ```text
//! "/a/<id>/*"  → split on '/' → ["a", "<id>"] as children, "*" as terminal
//! "/a/7/x/y"   → "a" (static) → "7" (holder, id=7) → "x/y" (match-all, *0="x/y")
//! ```
//!
//! # Design Decisions
//! - Siblings kept in `SegmentKind` order, stable within a kind
//! - Depth-first matching with backtracking; abandoned branches unbind their params
//! - Immutable after startup, so lookups share it without locks

use crate::routing::error::RouteError;
use crate::routing::params::Params;
use crate::routing::pattern::{PatternSegment, SegmentKind};

/// Result of a successful lookup.
#[derive(Debug)]
pub struct Matched<'t, T> {
    pub value: &'t T,
    pub params: Params,
}

#[derive(Debug)]
struct Node<T> {
    segment: PatternSegment,
    /// Non-final segments.
    children: Vec<Node<T>>,
    /// Final segments; each carries a value.
    terminals: Vec<Node<T>>,
    value: Option<T>,
}

impl<T> Node<T> {
    fn new(segment: PatternSegment) -> Self {
        Self {
            segment,
            children: Vec::new(),
            terminals: Vec::new(),
            value: None,
        }
    }

    fn child_entry(&mut self, segment: PatternSegment) -> &mut Node<T> {
        let index = match self
            .children
            .iter()
            .position(|c| c.segment.raw() == segment.raw())
        {
            Some(index) => index,
            None => insert_ordered(&mut self.children, Node::new(segment)),
        };
        &mut self.children[index]
    }

    /// Returns false if an identical terminal already exists.
    fn add_terminal(&mut self, segment: PatternSegment, value: T) -> bool {
        if self
            .terminals
            .iter()
            .any(|t| t.segment.raw() == segment.raw())
        {
            return false;
        }
        let mut node = Node::new(segment);
        node.value = Some(value);
        insert_ordered(&mut self.terminals, node);
        true
    }

    fn match_path(&self, level: usize, uri: &str, params: &mut Params) -> Option<&Node<T>> {
        match uri.split_once('/') {
            None => self
                .terminals
                .iter()
                .find(|t| t.accepts_final(level, uri, params)),
            Some((segment, rest)) => self.match_children(level, uri, segment, rest, params),
        }
    }

    fn accepts_final(&self, level: usize, segment: &str, params: &mut Params) -> bool {
        match self.segment.kind() {
            SegmentKind::Static => self.segment.raw() == segment,
            SegmentKind::Regexp => self.segment.bind_regexp(segment, params),
            SegmentKind::Holder => {
                self.segment.bind_holder(segment, params);
                true
            }
            SegmentKind::MatchAll => {
                self.segment.bind_glob(level, segment, params);
                true
            }
        }
    }

    fn match_children(
        &self,
        level: usize,
        uri: &str,
        segment: &str,
        rest: &str,
        params: &mut Params,
    ) -> Option<&Node<T>> {
        for child in &self.children {
            let mark = params.len();
            let found = match child.segment.kind() {
                SegmentKind::Static if child.segment.raw() == segment => {
                    child.match_path(level, rest, params)
                }
                SegmentKind::Static => None,
                SegmentKind::Regexp if child.segment.bind_regexp(segment, params) => {
                    child.match_path(level, rest, params)
                }
                SegmentKind::Regexp => None,
                SegmentKind::Holder => {
                    let found = child.match_path(level, rest, params);
                    if found.is_some() {
                        child.segment.bind_holder(segment, params);
                    }
                    found
                }
                SegmentKind::MatchAll => child.match_glob(level, uri, params),
            };
            if found.is_some() {
                return found;
            }
            params.truncate(mark);
        }

        // A trailing match-all terminal swallows whatever is left.
        let last = self.terminals.last()?;
        if last.segment.kind() == SegmentKind::MatchAll {
            last.segment.bind_glob(level, uri, params);
            return Some(last);
        }
        None
    }

    /// Non-final match-all: consume whole segments, shortest first.
    fn match_glob(&self, level: usize, uri: &str, params: &mut Params) -> Option<&Node<T>> {
        for (at, _) in uri.match_indices('/') {
            let mark = params.len();
            if let Some(found) = self.match_path(level + 1, &uri[at + 1..], params) {
                self.segment.bind_glob(level, &uri[..at], params);
                return Some(found);
            }
            params.truncate(mark);
        }
        None
    }
}

fn insert_ordered<T>(nodes: &mut Vec<Node<T>>, node: Node<T>) -> usize {
    let at = nodes
        .iter()
        .position(|n| n.segment.kind() > node.segment.kind())
        .unwrap_or(nodes.len());
    nodes.insert(at, node);
    at
}

/// Routing tree for one HTTP method.
#[derive(Debug)]
pub struct Tree<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            root: Node::new(PatternSegment::root()),
            len: 0,
        }
    }

    /// Number of routes stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a route. Returns whether every segment of it is static.
    pub fn add(&mut self, path: &str, value: T) -> Result<bool, RouteError> {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let compile = |raw: &str| {
            PatternSegment::compile(raw).map_err(|source| RouteError::Pattern {
                path: path.to_string(),
                source,
            })
        };

        let mut raw_segments = trimmed.split('/');
        let last = raw_segments.next_back().unwrap_or("");

        let mut fully_static = true;
        let mut node = &mut self.root;
        for raw in raw_segments {
            let segment = compile(raw)?;
            fully_static &= segment.is_static();
            node = node.child_entry(segment);
        }

        let segment = compile(last)?;
        fully_static &= segment.is_static();
        if !node.add_terminal(segment, value) {
            return Err(RouteError::Conflict {
                path: path.to_string(),
            });
        }

        self.len += 1;
        Ok(fully_static)
    }

    /// Resolve `path`, collecting parameters into a fresh [`Params`].
    pub fn find(&self, path: &str) -> Option<Matched<'_, T>> {
        let mut params = Params::new();
        let value = self.find_into(path, &mut params)?;
        Some(Matched { value, params })
    }

    /// Resolve `path`, appending parameters to `params`.
    ///
    /// On a miss `params` is left as it was passed in.
    pub fn find_into(&self, path: &str, params: &mut Params) -> Option<&T> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let mark = params.len();
        let value = self
            .root
            .match_path(0, trimmed, params)
            .and_then(|node| node.value.as_ref());
        if value.is_none() {
            params.truncate(mark);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(routes: &[&'static str]) -> Tree<&'static str> {
        let mut tree = Tree::new();
        for route in routes {
            tree.add(route, *route).unwrap();
        }
        tree
    }

    fn names(params: &Params) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect()
    }

    #[test]
    fn test_root_and_nested_routes() {
        let tree = tree(&["/", "/a", "/a/b"]);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.find("/").unwrap().value, &"/");
        assert_eq!(tree.find("/a").unwrap().value, &"/a");
        assert_eq!(tree.find("/a/").unwrap().value, &"/a");
        assert_eq!(tree.find("/a/b").unwrap().value, &"/a/b");
        assert!(tree.find("/b").is_none());
        assert!(tree.find("/a/b/c").is_none());
    }

    #[test]
    fn test_static_beats_holder_and_match_all() {
        let orders: [[&str; 3]; 3] = [
            ["/abc", "/<id>", "/*"],
            ["/*", "/<id>", "/abc"],
            ["/<id>", "/*", "/abc"],
        ];
        for order in orders {
            let tree = tree(&order);
            let found = tree.find("/abc").unwrap();
            assert_eq!(found.value, &"/abc");
            assert!(found.params.is_empty());

            let found = tree.find("/xyz").unwrap();
            assert_eq!(found.value, &"/<id>");
            assert_eq!(found.params.get("id"), Some("xyz"));

            let found = tree.find("/x/y").unwrap();
            assert_eq!(found.value, &"/*");
            assert_eq!(found.params.get("*0"), Some("x/y"));
        }
    }

    #[test]
    fn test_match_all_binds_remainder() {
        let tree = tree(&["/file/*"]);
        let found = tree.find("/file/a/b.png").unwrap();
        assert_eq!(names(&found.params), [("*0", "a/b.png")]);

        let tree = self::tree(&["/*"]);
        let found = tree.find("/f/a.png").unwrap();
        assert_eq!(names(&found.params), [("*0", "f/a.png")]);
    }

    #[test]
    fn test_named_and_discarded_match_all() {
        let tree = tree(&["/file/*name"]);
        let found = tree.find("/file/a/b.png").unwrap();
        assert_eq!(names(&found.params), [("name", "a/b.png")]);

        let tree = self::tree(&["/file/*_"]);
        let found = tree.find("/file/a/b.png").unwrap();
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_nested_positional_globs() {
        let tree = tree(&["/file/*/*"]);
        let found = tree.find("/file/f/a.png").unwrap();
        assert_eq!(found.params.get("*0"), Some("f"));
        assert_eq!(found.params.get("*1"), Some("a.png"));
        assert_eq!(found.params.tail(), Some("a.png"));

        let tree = self::tree(&["/file/*/*f"]);
        let found = tree.find("/file/f/a.png").unwrap();
        assert_eq!(found.params.len(), 2);
        assert_eq!(found.params.get("f"), Some("a.png"));

        let tree = self::tree(&["/file/*/*_"]);
        let found = tree.find("/file/f/a.png").unwrap();
        assert_eq!(found.params.len(), 1);
    }

    #[test]
    fn test_inner_glob_spans_segments() {
        let tree = tree(&["/static/*path/raw"]);
        let found = tree.find("/static/a/b/raw").unwrap();
        assert_eq!(names(&found.params), [("path", "a/b")]);
        assert!(tree.find("/static/a/b").is_none());
    }

    #[test]
    fn test_discarded_holder() {
        let tree = tree(&["/b/<_>"]);
        let found = tree.find("/b/anything").unwrap();
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_backtracking_drops_stale_params() {
        let tree = tree(&[r"/<id ~ (\d+)>/a", "/<name>/b"]);
        let found = tree.find("/12/b").unwrap();
        assert_eq!(found.value, &"/<name>/b");
        assert_eq!(names(&found.params), [("name", "12")]);

        let tree = self::tree(&["/users/new/x", "/users/<id>/edit"]);
        let found = tree.find("/users/new/edit").unwrap();
        assert_eq!(names(&found.params), [("id", "new")]);
    }

    #[test]
    fn test_regexp_segments() {
        let tree = tree(&[r"/<id ~ z(\d*)b>", r"/d/<y,m ~ (\d{4})-(\d{2})>"]);
        let found = tree.find("/z42b").unwrap();
        assert_eq!(found.params.get("id"), Some("42"));
        assert!(tree.find("/z42").is_none());

        let found = tree.find("/d/2024-05").unwrap();
        assert_eq!(names(&found.params), [("y", "2024"), ("m", "05")]);
    }

    #[test]
    fn test_holder_binds_empty_segment() {
        let tree = tree(&["/a/<id>/b"]);
        let found = tree.find("/a//b").unwrap();
        assert_eq!(names(&found.params), [("id", "")]);
        assert_eq!(tree.find("/a/1/b").unwrap().params.get("id"), Some("1"));

        let tree = self::tree(&["/<id>"]);
        let found = tree.find("/").unwrap();
        assert_eq!(names(&found.params), [("id", "")]);
    }

    #[test]
    fn test_miss_leaves_params_untouched() {
        let tree = tree(&["/<a>/<b>/c"]);
        let mut params = Params::new();
        params.push("keep", "1");
        assert!(tree.find_into("/x/y/z", &mut params).is_none());
        assert_eq!(names(&params), [("keep", "1")]);
    }

    #[test]
    fn test_lookup_is_repeatable() {
        let tree = tree(&["/a/<id>", "/a/b/*"]);
        let first = tree.find("/a/b/c/d").unwrap();
        for _ in 0..3 {
            let again = tree.find("/a/b/c/d").unwrap();
            assert_eq!(again.value, first.value);
            assert_eq!(again.params, first.params);
        }
    }

    #[test]
    fn test_add_reports_static_routes() {
        let mut tree = Tree::new();
        assert!(tree.add("/a/b", 1).unwrap());
        assert!(!tree.add("/a/<id>", 2).unwrap());
        assert!(!tree.add("/a/<id>/c", 3).unwrap());
        assert!(tree.add("/", 4).unwrap());
    }

    #[test]
    fn test_identical_terminal_conflicts() {
        let mut tree = Tree::new();
        tree.add("/a/<id>", 1).unwrap();
        let err = tree.add("/a/<id>", 2).unwrap_err();
        assert!(matches!(err, RouteError::Conflict { .. }));
        assert_eq!(tree.find("/a/7").unwrap().value, &1);
    }

    #[test]
    fn test_invalid_segment_is_rejected() {
        let mut tree: Tree<u8> = Tree::new();
        let err = tree.add("/a/<id1,id2 ~ z(\\d*)b>", 1).unwrap_err();
        assert!(matches!(err, RouteError::Pattern { .. }));
        assert!(tree.is_empty());
    }
}
