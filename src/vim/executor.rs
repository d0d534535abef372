//! Dynamic esxcli execution: schema lookup via the well-known CLI info
//! handle, envelope assembly, and fault/success demultiplexing.
//!
//! The describe call (`vim.CLIInfo.FetchCLIInfo` against [`CLI_INFO_MOID`])
//! enumerates every method of a namespace with its parameter list; nothing is
//! cached, each invocation may target different remote state. The executor
//! performs exactly one blocking transport call per envelope, no retries;
//! timeout policy belongs to the transport layer.

use serde::Serialize;

use super::command::{Command, ParamInfo, SoapArgument};
use super::error::{Result, VimError};
use super::{ObjectRef, Transport};

/// Well-known handle the meta-describe call is issued against.
pub const CLI_INFO_MOID: &str = "ha-dynamic-type-manager-local-cli-cliinfo";

/// Wire protocol version stamped on every envelope.
pub const PROTOCOL_VERSION: &str = "urn:vim25/5.0";

/// One method of a namespace as reported by the describe call.
#[derive(Debug, Clone, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
}

/// Describe response: every method known in one namespace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MethodCatalog {
    pub methods: Vec<MethodInfo>,
}

impl MethodCatalog {
    /// Exact, case-sensitive name lookup.
    pub fn find(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Fully assembled RPC request, sent as-is.
#[derive(Debug, Clone)]
pub struct RpcEnvelope {
    /// Bound method-executer reference.
    pub this: ObjectRef,
    /// Management handle identifier (`ha-cli-handler-...`).
    pub moid: String,
    /// Fully-qualified method identifier (`vim.EsxCLI....`).
    pub method: String,
    pub version: String,
    pub argument: Vec<SoapArgument>,
}

/// Polymorphic remote outcome. The sum type makes fault/payload mutual
/// exclusivity structural rather than a pair of optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcOutcome {
    /// Explicit rejection carrying a human-readable message.
    Fault(String),
    /// Raw response payload, decoded (if at all) by the caller.
    Success(String),
}

/// Successful call result: the undecoded payload.
#[derive(Debug, Clone)]
pub struct Response {
    pub payload: String,
}

/// Binds a transport and a remote handle and runs esxcli command lines
/// end-to-end: descriptor -> schema -> coercion -> envelope -> outcome.
pub struct Executor<'a, T: Transport + ?Sized> {
    transport: &'a T,
    handle: ObjectRef,
}

impl<'a, T: Transport + ?Sized> Executor<'a, T> {
    pub fn new(transport: &'a T, handle: ObjectRef) -> Self {
        Self { transport, handle }
    }

    /// Describe a namespace without selecting a method.
    pub fn namespace_info(&self, namespace: &str) -> Result<MethodCatalog> {
        self.transport.describe(CLI_INFO_MOID, namespace)
    }

    /// Fetch the parameter schema for one command, scanning the namespace
    /// catalog for an exact name match.
    pub fn command_info(&self, cmd: &Command) -> Result<Vec<ParamInfo>> {
        let catalog = self.namespace_info(cmd.namespace())?;

        catalog
            .find(cmd.name())
            .map(|m| m.params.clone())
            .ok_or_else(|| VimError::MethodNotFound {
                name: cmd.name().to_string(),
                namespace: cmd.namespace().to_string(),
            })
    }

    /// Assemble an envelope from raw argv: Built state of the call.
    pub fn new_request(&self, args: &[String]) -> Result<RpcEnvelope> {
        let cmd = Command::new(args)?;
        let params = self.command_info(&cmd)?;
        let argument = cmd.parse(&params)?;

        Ok(RpcEnvelope {
            this: self.handle.clone(),
            moid: cmd.moid(),
            method: cmd.method(),
            version: PROTOCOL_VERSION.to_string(),
            argument,
        })
    }

    /// Sent state: one blocking dispatch, then demultiplex. A fault never
    /// yields a payload; transport failures propagate unchanged.
    pub fn execute(&self, envelope: &RpcEnvelope) -> Result<Response> {
        match self.transport.execute(envelope)? {
            RpcOutcome::Fault(message) => Err(VimError::Fault(message)),
            RpcOutcome::Success(payload) => Ok(Response { payload }),
        }
    }

    /// End-to-end: `run(["network","vm","list"])`.
    pub fn run(&self, args: &[String]) -> Result<Response> {
        let envelope = self.new_request(args)?;
        self.execute(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vim::FixtureClient;
    use crate::vim::tests::demo_client;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn executor(c: &FixtureClient) -> Executor<'_, FixtureClient> {
        Executor::new(c, ObjectRef::new("HostSystem", "node-3"))
    }

    #[test]
    fn envelope_assembly() {
        let c = demo_client();
        let e = executor(&c);
        let req = e
            .new_request(&argv(&[
                "system",
                "settings",
                "advanced",
                "set",
                "-i",
                "1",
                "-o",
                "/Net/GuestIPHack",
            ]))
            .unwrap();

        assert_eq!(req.moid, "ha-cli-handler-system-settings-advanced");
        assert_eq!(req.method, "vim.EsxCLI.system.settings.advanced.set");
        assert_eq!(req.version, PROTOCOL_VERSION);
        let vals: Vec<_> = req.argument.iter().map(|a| a.val.as_str()).collect();
        assert_eq!(
            vals,
            vec!["<intvalue>1</intvalue>", "<option>/Net/GuestIPHack</option>"]
        );
    }

    #[test]
    fn run_returns_raw_payload() {
        let c = demo_client();
        let res = executor(&c).run(&argv(&["network", "vm", "list"])).unwrap();
        assert!(res.payload.contains("lurker"));
    }

    #[test]
    fn method_lookup_is_case_sensitive() {
        let c = demo_client();
        let e = executor(&c);

        let err = e.run(&argv(&["network", "vm", "List"])).unwrap_err();
        match err {
            VimError::MethodNotFound { name, namespace } => {
                assert_eq!(name, "List");
                assert_eq!(namespace, "network.vm");
            }
            other => panic!("expected MethodNotFound, got {other:?}"),
        }
    }

    #[test]
    fn unknown_namespace_is_method_not_found() {
        let c = demo_client();
        let err = executor(&c)
            .run(&argv(&["storage", "core", "device", "list"]))
            .unwrap_err();
        assert!(matches!(err, VimError::MethodNotFound { .. }));
    }

    #[test]
    fn fault_surfaces_without_payload() {
        let c = FixtureClient::from_json(
            r#"{
              "inventory": { "name": "", "children": [] },
              "cli": {
                "network.firewall": {
                  "unload": { "params": [], "fault": "firewall module is in use" }
                }
              }
            }"#,
        )
        .unwrap();

        let err = executor(&c)
            .run(&argv(&["network", "firewall", "unload"]))
            .unwrap_err();
        match err {
            VimError::Fault(msg) => assert_eq!(msg, "firewall module is in use"),
            other => panic!("expected Fault, got {other:?}"),
        }
    }

    #[test]
    fn outcome_variants_are_exclusive() {
        // Structural check: an outcome is either a fault or a payload.
        let fault = RpcOutcome::Fault("broken".into());
        let ok = RpcOutcome::Success("<x/>".into());
        assert!(matches!(fault, RpcOutcome::Fault(_)));
        assert!(matches!(ok, RpcOutcome::Success(_)));
        assert_ne!(fault, ok);
    }

    #[test]
    fn empty_payload_is_success() {
        let c = demo_client();
        let res = executor(&c)
            .run(&argv(&[
                "system",
                "settings",
                "advanced",
                "set",
                "-o",
                "/Net/GuestIPHack",
                "-i",
                "1",
            ]))
            .unwrap();
        assert!(res.payload.is_empty());
    }
}
