//! Target parsing (fixture file vs remote URL) and collaborator seams.
//!
//! parse_target -> TargetSpec { Fixture | RemoteUrl }
//! Traits: Inventory (child enumeration / ancestors), Transport (describe +
//! execute). FixtureClient implements both from a JSON document so every
//! command runs end-to-end without a live endpoint. Remote vSphere transports
//! (session, SOAP-over-HTTP) not implemented yet.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult, bail};
use serde::Deserialize;
use url::Url;

pub mod command;
pub mod error;
pub mod executor;
pub mod list;
pub mod path;

use command::{ParamInfo, WireType, cli_handler_moid};
use error::{Result, VimError};
use executor::{MethodCatalog, MethodInfo, RpcEnvelope, RpcOutcome};

/* -------------------------------------------------------------------------- */
/* Object references                                                          */
/* -------------------------------------------------------------------------- */

/// Opaque managed-object reference: a type name plus an endpoint-scoped id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub kind: String,
    pub value: String,
}

impl ObjectRef {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// One entry of an ancestor chain, root first.
#[derive(Debug, Clone)]
pub struct Ancestor {
    pub name: String,
    /// The root sentinel itself; skipped when building inventory paths.
    pub is_root: bool,
}

/* -------------------------------------------------------------------------- */
/* Collaborator traits                                                        */
/* -------------------------------------------------------------------------- */

/// Inventory collaborator: read access to the remote object tree.
///
/// Every call is a single blocking round trip reflecting the tree's state at
/// that moment; the tree may change between calls.
pub trait Inventory {
    /// The protocol-defined global root.
    fn global_root(&self) -> ObjectRef;

    /// Immediate children of `obj`, in enumeration order.
    fn children(&self, obj: &ObjectRef) -> Result<Vec<(String, ObjectRef)>>;

    /// Ancestor chain of `obj`, root first, including `obj` itself.
    fn ancestors(&self, obj: &ObjectRef) -> Result<Vec<Ancestor>>;

    /// Whether `obj` is a non-leaf container (folder-like) that a bare path
    /// expands into rather than matching directly.
    fn is_container(&self, obj: &ObjectRef) -> bool;
}

/// Transport collaborator: the two wire operations the core needs.
///
/// Both are single blocking calls; failures surface as
/// [`VimError::Transport`] and are never retried here.
pub trait Transport {
    /// Meta-describe: enumerate the methods of a namespace via the well-known
    /// CLI info handle.
    fn describe(&self, handle: &str, namespace: &str) -> Result<MethodCatalog>;

    /// Dispatch one encoded envelope and return the polymorphic outcome.
    fn execute(&self, envelope: &RpcEnvelope) -> Result<RpcOutcome>;
}

/* -------------------------------------------------------------------------- */
/* Target parsing                                                             */
/* -------------------------------------------------------------------------- */

/// A parsed representation of a user-supplied target string.
#[derive(Debug, Clone)]
pub enum TargetSpec {
    /// Path to a JSON fixture file describing inventory + esxcli catalog.
    Fixture { original: String, file: PathBuf },
    /// Remote vSphere endpoint (http/https). Scaffold only.
    RemoteUrl { original: String, url: Url },
}

impl TargetSpec {
    /// Returns the original user-supplied form.
    pub fn original(&self) -> &str {
        match self {
            TargetSpec::Fixture { original, .. } => original,
            TargetSpec::RemoteUrl { original, .. } => original,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TargetSpec::RemoteUrl { .. })
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Fixture { file, .. } => write!(f, "fixture: {}", file.display()),
            TargetSpec::RemoteUrl { url, .. } => write!(f, "remote: {url}"),
        }
    }
}

/// Attempt to parse a `--target` value into a structured `TargetSpec`.
///
/// Parsing Strategy:
/// 1. Try to parse as URL. If successful and scheme is http/https, treat as a
///    remote endpoint.
/// 2. Otherwise treat as a fixture file path (must exist).
/// 3. Reject empty input with a contextual error.
pub fn parse_target(raw: &str) -> AnyResult<TargetSpec> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Target string is empty");
    }

    if let Ok(url) = Url::parse(trimmed) {
        match url.scheme() {
            "http" | "https" => {
                return Ok(TargetSpec::RemoteUrl {
                    original: raw.to_string(),
                    url,
                });
            }
            _ => {
                // Non-endpoint scheme (or a bare path that happened to parse);
                // fall through to fixture handling.
            }
        }
    }

    let file = PathBuf::from(trimmed);
    if !file.is_file() {
        bail!("target is neither an http(s) URL nor an existing fixture file: '{trimmed}'");
    }

    Ok(TargetSpec::Fixture {
        original: raw.to_string(),
        file,
    })
}

/* -------------------------------------------------------------------------- */
/* Fixture client                                                             */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
struct FixtureDoc {
    inventory: FixtureNodeDoc,
    #[serde(default)]
    cli: BTreeMap<String, BTreeMap<String, FixtureMethodDoc>>,
}

#[derive(Debug, Deserialize)]
struct FixtureNodeDoc {
    name: String,
    #[serde(default)]
    kind: Option<String>,
    /// Present (even empty) for containers, absent for leaves.
    #[serde(default)]
    children: Option<Vec<FixtureNodeDoc>>,
}

#[derive(Debug, Deserialize)]
struct FixtureMethodDoc {
    #[serde(default)]
    params: Vec<FixtureParamDoc>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    fault: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FixtureParamDoc {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Debug)]
struct FixtureNode {
    name: String,
    kind: String,
    parent: Option<usize>,
    children: Vec<usize>,
    container: bool,
}

/// In-memory stand-in for a live endpoint: serves both collaborator traits
/// from a JSON fixture document.
#[derive(Debug)]
pub struct FixtureClient {
    nodes: Vec<FixtureNode>,
    /// namespace -> method name -> doc
    cli: BTreeMap<String, BTreeMap<String, FixtureMethodDoc>>,
    /// handler moid -> namespace, precomputed for execute() dispatch
    handlers: BTreeMap<String, String>,
}

impl FixtureClient {
    pub fn from_file(file: &Path) -> AnyResult<Self> {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read fixture file: {}", file.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse fixture file: {}", file.display()))
    }

    pub fn from_json(text: &str) -> AnyResult<Self> {
        let doc: FixtureDoc = serde_json::from_str(text).context("invalid fixture document")?;

        let mut nodes = Vec::new();
        flatten(&doc.inventory, None, &mut nodes);

        let handlers = doc
            .cli
            .keys()
            .map(|ns| (cli_handler_moid(ns), ns.clone()))
            .collect();

        Ok(Self {
            nodes,
            cli: doc.cli,
            handlers,
        })
    }

    fn node_ref(&self, idx: usize) -> ObjectRef {
        ObjectRef::new(self.nodes[idx].kind.clone(), format!("node-{idx}"))
    }

    fn resolve(&self, obj: &ObjectRef) -> Result<usize> {
        obj.value
            .strip_prefix("node-")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&idx| idx < self.nodes.len())
            .ok_or_else(|| VimError::transport_msg(format!("stale object reference: {obj}")))
    }

    fn catalog_for(&self, namespace: &str) -> MethodCatalog {
        let methods = self
            .cli
            .get(namespace)
            .map(|methods| {
                methods
                    .iter()
                    .map(|(name, m)| MethodInfo {
                        name: name.clone(),
                        params: m
                            .params
                            .iter()
                            .map(|p| ParamInfo {
                                name: p.name.clone(),
                                wire_type: WireType::from_type_name(&p.type_name),
                            })
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        MethodCatalog { methods }
    }
}

fn flatten(doc: &FixtureNodeDoc, parent: Option<usize>, out: &mut Vec<FixtureNode>) {
    let container = doc.children.is_some();
    let kind = doc.kind.clone().unwrap_or_else(|| {
        if container {
            "Folder".to_string()
        } else {
            "ManagedEntity".to_string()
        }
    });

    let idx = out.len();
    out.push(FixtureNode {
        name: doc.name.clone(),
        kind,
        parent,
        children: Vec::new(),
        container,
    });

    if let Some(children) = &doc.children {
        for child in children {
            let child_idx = out.len();
            out[idx].children.push(child_idx);
            flatten(child, Some(idx), out);
        }
    }
}

impl Inventory for FixtureClient {
    fn global_root(&self) -> ObjectRef {
        self.node_ref(0)
    }

    fn children(&self, obj: &ObjectRef) -> Result<Vec<(String, ObjectRef)>> {
        let idx = self.resolve(obj)?;
        Ok(self.nodes[idx]
            .children
            .iter()
            .map(|&c| (self.nodes[c].name.clone(), self.node_ref(c)))
            .collect())
    }

    fn ancestors(&self, obj: &ObjectRef) -> Result<Vec<Ancestor>> {
        let mut idx = self.resolve(obj)?;
        let mut chain = vec![idx];
        while let Some(parent) = self.nodes[idx].parent {
            chain.push(parent);
            idx = parent;
        }
        chain.reverse();

        Ok(chain
            .into_iter()
            .map(|i| Ancestor {
                name: self.nodes[i].name.clone(),
                is_root: self.nodes[i].parent.is_none(),
            })
            .collect())
    }

    fn is_container(&self, obj: &ObjectRef) -> bool {
        self.resolve(obj)
            .map(|idx| self.nodes[idx].container)
            .unwrap_or(false)
    }
}

impl Transport for FixtureClient {
    fn describe(&self, handle: &str, namespace: &str) -> Result<MethodCatalog> {
        if handle != executor::CLI_INFO_MOID {
            return Err(VimError::transport_msg(format!(
                "describe issued against unexpected handle: {handle}"
            )));
        }
        // Unknown namespace yields an empty catalog; method lookup surfaces
        // the MethodNotFound diagnostic.
        Ok(self.catalog_for(namespace))
    }

    fn execute(&self, envelope: &RpcEnvelope) -> Result<RpcOutcome> {
        let Some(namespace) = self.handlers.get(&envelope.moid) else {
            return Ok(RpcOutcome::Fault(format!(
                "unknown cli handler: {}",
                envelope.moid
            )));
        };

        let name = envelope.method.rsplit('.').next().unwrap_or_default();
        let Some(method) = self.cli.get(namespace).and_then(|m| m.get(name)) else {
            return Ok(RpcOutcome::Fault(format!(
                "unknown method: {}",
                envelope.method
            )));
        };

        if let Some(fault) = &method.fault {
            return Ok(RpcOutcome::Fault(fault.clone()));
        }

        Ok(RpcOutcome::Success(
            method.response.clone().unwrap_or_default(),
        ))
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small datacenter-shaped fixture shared by core tests.
    pub(crate) fn demo_client() -> FixtureClient {
        FixtureClient::from_json(
            r#"{
              "inventory": {
                "name": "", "kind": "Folder",
                "children": [
                  {
                    "name": "ha-datacenter", "kind": "Datacenter",
                    "children": [
                      {
                        "name": "host", "kind": "Folder",
                        "children": [
                          { "name": "esx-1.local", "kind": "HostSystem" },
                          { "name": "esx-2.local", "kind": "HostSystem" }
                        ]
                      },
                      { "name": "vm", "kind": "Folder", "children": [] }
                    ]
                  }
                ]
              },
              "cli": {
                "network.vm": {
                  "list": { "params": [], "response": "<VirtualMachine><Name>lurker</Name></VirtualMachine>" }
                },
                "system.settings.advanced": {
                  "set": {
                    "params": [
                      { "name": "default", "type": "boolean" },
                      { "name": "intvalue", "type": "long" },
                      { "name": "option", "type": "string" },
                      { "name": "stringvalue", "type": "string" }
                    ],
                    "response": ""
                  }
                }
              }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parse_remote_http() {
        let spec = parse_target("https://vc01.local/sdk").unwrap();
        assert!(spec.is_remote());
    }

    #[test]
    fn empty_target_rejected() {
        let err = parse_target("   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn missing_fixture_rejected() {
        let err = parse_target("/no/such/fixture.json").unwrap_err();
        assert!(err.to_string().contains("fixture"));
    }

    #[test]
    fn children_enumeration_order() {
        let c = demo_client();
        let root = c.global_root();
        let kids = c.children(&root).unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].0, "ha-datacenter");

        let host_folder = {
            let dc = &kids[0].1;
            let under_dc = c.children(dc).unwrap();
            assert_eq!(under_dc[0].0, "host");
            under_dc[0].1.clone()
        };
        let hosts = c.children(&host_folder).unwrap();
        assert_eq!(hosts[0].0, "esx-1.local");
        assert_eq!(hosts[1].0, "esx-2.local");
    }

    #[test]
    fn ancestors_root_first() {
        let c = demo_client();
        let dc = c.children(&c.global_root()).unwrap()[0].1.clone();
        let host_folder = c.children(&dc).unwrap()[0].1.clone();
        let chain = c.ancestors(&host_folder).unwrap();
        let names: Vec<_> = chain.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["", "ha-datacenter", "host"]);
        assert!(chain[0].is_root);
        assert!(!chain[1].is_root);
    }

    #[test]
    fn leaf_vs_container() {
        let c = demo_client();
        let dc = c.children(&c.global_root()).unwrap()[0].1.clone();
        assert!(c.is_container(&dc));
        let host_folder = c.children(&dc).unwrap()[0].1.clone();
        let host = c.children(&host_folder).unwrap()[0].1.clone();
        assert!(!c.is_container(&host));
        assert_eq!(host.kind, "HostSystem");
    }

    #[test]
    fn describe_unknown_namespace_is_empty() {
        let c = demo_client();
        let cat = c.describe(executor::CLI_INFO_MOID, "storage.core").unwrap();
        assert!(cat.methods.is_empty());
    }

    #[test]
    fn describe_wrong_handle_is_transport_error() {
        let c = demo_client();
        let err = c.describe("ha-other-handle", "network.vm").unwrap_err();
        assert!(matches!(err, VimError::Transport(_)));
    }
}
