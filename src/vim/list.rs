//! Inventory tree traversal: glob-driven recursion plus the resolver entry
//! points commands consume (`list`, `list_slice`, `resolve_one`).
//!
//! Nothing here caches across calls; the inventory is live and every child
//! enumeration reflects the tree at the moment of that round trip.

use super::error::{Result, VimError};
use super::path::{self, PathSegment};
use super::{Inventory, ObjectRef};

/// One resolved inventory object together with its absolute slash path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub path: String,
    pub object: ObjectRef,
}

/// Walks the tree one segment at a time, matching children against globs.
pub struct Recurser<'a, I: Inventory + ?Sized> {
    pub inventory: &'a I,
    /// When false, a bare container path expands to its immediate children
    /// ("contents of", the expected default for listing).
    pub traverse_leafs: bool,
}

impl<'a, I: Inventory + ?Sized> Recurser<'a, I> {
    pub fn recurse(&self, root: Element, parts: &[PathSegment]) -> Result<Vec<Element>> {
        let Some((head, rest)) = parts.split_first() else {
            if !self.traverse_leafs && self.inventory.is_container(&root.object) {
                let children = self.inventory.children(&root.object)?;
                return Ok(children
                    .into_iter()
                    .map(|(name, object)| Element {
                        path: path::join(&root.path, &name),
                        object,
                    })
                    .collect());
            }
            return Ok(vec![root]);
        };

        let pattern = match head {
            PathSegment::Glob(p) => p,
            // The resolver strips a leading pivot before recursing.
            PathSegment::Pivot => {
                return Err(VimError::Argument(
                    "relative marker is only valid at the start of an expression".into(),
                ));
            }
        };

        let mut out = Vec::new();
        for (name, object) in self.inventory.children(&root.object)? {
            if !path::glob_match(pattern, &name) {
                continue;
            }
            let child = Element {
                path: path::join(&root.path, &name),
                object,
            };
            out.extend(self.recurse(child, rest)?);
        }

        // Zero matches is a valid empty result; cardinality is the caller's
        // concern (see resolve_one).
        Ok(out)
    }
}

/// Resolve one path expression against the inventory.
///
/// Resolution starts from the global root (`"/"`). A leading `.` invokes
/// `relative` exactly once to obtain a pivot object, rebuilds the pivot's
/// absolute path from its ancestor chain (root sentinel skipped), and
/// continues from there.
pub fn list<I, F>(inventory: &I, expr: &str, traverse_leafs: bool, relative: F) -> Result<Vec<Element>>
where
    I: Inventory + ?Sized,
    F: FnOnce() -> Result<ObjectRef>,
{
    let mut segments = path::parse(expr)?;

    let mut root = Element {
        path: "/".to_string(),
        object: inventory.global_root(),
    };

    if segments.first() == Some(&PathSegment::Pivot) {
        let pivot = relative()?;

        let mut abs = String::from("/");
        for ancestor in inventory.ancestors(&pivot)? {
            // Skip the root sentinel when building the inventory path.
            if ancestor.is_root {
                continue;
            }
            abs = path::join(&abs, &ancestor.name);
        }

        root = Element {
            path: abs,
            object: pivot,
        };
        segments.remove(0);
    }

    let recurser = Recurser {
        inventory,
        traverse_leafs,
    };
    recurser.recurse(root, &segments)
}

/// Union across multiple expressions, preserving caller-supplied order.
pub fn list_slice<I, F>(
    inventory: &I,
    exprs: &[String],
    traverse_leafs: bool,
    mut relative: F,
) -> Result<Vec<Element>>
where
    I: Inventory + ?Sized,
    F: FnMut() -> Result<ObjectRef>,
{
    let mut out = Vec::new();
    for expr in exprs {
        out.extend(list(inventory, expr, traverse_leafs, &mut relative)?);
    }
    Ok(out)
}

/// Resolve an expression that must denote exactly one object.
///
/// The error distinguishes "no such object" from "resolves to N objects" so
/// the user can tell an empty match from an ambiguous one.
pub fn resolve_one<I, F>(inventory: &I, expr: &str, relative: F) -> Result<Element>
where
    I: Inventory + ?Sized,
    F: FnOnce() -> Result<ObjectRef>,
{
    let mut matches = list(inventory, expr, true, relative)?;
    match matches.len() {
        0 => Err(VimError::NoMatch { expr: expr.into() }),
        1 => Ok(matches.remove(0)),
        count => Err(VimError::Ambiguous {
            expr: expr.into(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vim::tests::demo_client;
    use crate::vim::{Ancestor, FixtureClient, Inventory};
    use std::cell::Cell;

    fn no_pivot() -> Result<ObjectRef> {
        panic!("relative root requested for an absolute expression");
    }

    fn paths(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn root_expands_to_children() {
        let c = demo_client();
        let es = list(&c, "/", false, no_pivot).unwrap();
        assert_eq!(paths(&es), vec!["/ha-datacenter"]);
    }

    #[test]
    fn root_with_traverse_leafs_is_itself() {
        let c = demo_client();
        let es = list(&c, "/", true, no_pivot).unwrap();
        assert_eq!(paths(&es), vec!["/"]);
    }

    #[test]
    fn glob_matches_hosts() {
        let c = demo_client();
        let es = list(&c, "ha-*/host/esx-?.local", true, no_pivot).unwrap();
        assert_eq!(
            paths(&es),
            vec![
                "/ha-datacenter/host/esx-1.local",
                "/ha-datacenter/host/esx-2.local"
            ]
        );
        assert_eq!(es[0].object.kind, "HostSystem");
    }

    #[test]
    fn bare_container_lists_contents() {
        let c = demo_client();
        let es = list(&c, "ha-datacenter/host", false, no_pivot).unwrap();
        assert_eq!(es.len(), 2);

        let es = list(&c, "ha-datacenter/host", true, no_pivot).unwrap();
        assert_eq!(paths(&es), vec!["/ha-datacenter/host"]);
    }

    #[test]
    fn empty_container_is_empty_not_error() {
        let c = demo_client();
        let es = list(&c, "ha-datacenter/vm", false, no_pivot).unwrap();
        assert!(es.is_empty());
    }

    #[test]
    fn zero_matches_is_empty_not_error() {
        let c = demo_client();
        let es = list(&c, "no-such-dc/*", false, no_pivot).unwrap();
        assert!(es.is_empty());
    }

    #[test]
    fn dotdot_fails_resolution() {
        let c = demo_client();
        let err = list(&c, "ha-datacenter/..", false, no_pivot).unwrap_err();
        assert!(matches!(err, VimError::UnsupportedTraversal { .. }));
    }

    #[test]
    fn union_preserves_expression_order() {
        let c = demo_client();
        let exprs = vec![
            "ha-datacenter/host/esx-2.local".to_string(),
            "ha-datacenter/host/esx-1.local".to_string(),
        ];
        let es = list_slice(&c, &exprs, true, || no_pivot()).unwrap();
        assert_eq!(
            paths(&es),
            vec![
                "/ha-datacenter/host/esx-2.local",
                "/ha-datacenter/host/esx-1.local"
            ]
        );
    }

    /// Delegating inventory that counts child enumerations of the global root.
    struct Spy<'a> {
        inner: &'a FixtureClient,
        root_children_calls: Cell<usize>,
    }

    impl Inventory for Spy<'_> {
        fn global_root(&self) -> ObjectRef {
            self.inner.global_root()
        }
        fn children(&self, obj: &ObjectRef) -> Result<Vec<(String, ObjectRef)>> {
            if *obj == self.inner.global_root() {
                self.root_children_calls
                    .set(self.root_children_calls.get() + 1);
            }
            self.inner.children(obj)
        }
        fn ancestors(&self, obj: &ObjectRef) -> Result<Vec<Ancestor>> {
            self.inner.ancestors(obj)
        }
        fn is_container(&self, obj: &ObjectRef) -> bool {
            self.inner.is_container(obj)
        }
    }

    #[test]
    fn pivot_replaces_global_root() {
        let c = demo_client();
        let spy = Spy {
            inner: &c,
            root_children_calls: Cell::new(0),
        };

        let pivot_calls = Cell::new(0);
        let host_folder = {
            let dc = c.children(&c.global_root()).unwrap()[0].1.clone();
            c.children(&dc).unwrap()[0].1.clone()
        };

        let es = list(&spy, "./esx-1.local", true, || {
            pivot_calls.set(pivot_calls.get() + 1);
            Ok(host_folder.clone())
        })
        .unwrap();

        assert_eq!(pivot_calls.get(), 1);
        assert_eq!(spy.root_children_calls.get(), 0);
        assert_eq!(paths(&es), vec!["/ha-datacenter/host/esx-1.local"]);
    }

    #[test]
    fn resolve_one_cardinality() {
        let c = demo_client();

        let e = resolve_one(&c, "ha-datacenter/host/esx-1.local", no_pivot).unwrap();
        assert_eq!(e.path, "/ha-datacenter/host/esx-1.local");

        let err = resolve_one(&c, "ha-datacenter/host/esx-9.local", no_pivot).unwrap_err();
        assert!(matches!(err, VimError::NoMatch { .. }));

        let err = resolve_one(&c, "ha-datacenter/host/*", no_pivot).unwrap_err();
        match err {
            VimError::Ambiguous { count, .. } => assert_eq!(count, 2),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }
}
