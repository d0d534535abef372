//! `exec.rs`
//!
//! Implements the `exec` subcommand: run one dynamically-discovered esxcli
//! command against a host. The method's parameter schema is fetched at call
//! time, flag tokens are coerced against it, and the encoded envelope is
//! dispatched through the transport.
//!
//! Capabilities:
//!   - Command line as trailing tokens (`vimx exec network vm list`) or as one
//!     shell-quoted string (`vimx exec "network vm list"`); exec's own flags
//!     (--host, -t, ...) must come before the first command token
//!   - Parameter injection via the command line (`-option value`) and
//!     --param-file params.(json|yaml); command-line flags override file entries
//!   - Host selection with --host PATH (must resolve to exactly one object);
//!     default picks the single host under `*/host/*`
//!   - JSON or human-readable output; the success payload is printed undecoded
//!
//! JSON Success Output:
//! {
//!   "status": "ok",
//!   "command": "network.vm.list",
//!   "host": "/dc/host/esx-1.local",
//!   "target": "...",
//!   "payload": "<...>"
//! }
//!
//! JSON Error Output:
//! { "status": "error", "error": "message" }

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, color};
use crate::cmd::shared::{connect, output_error, relative_fn, resolve_target};
use crate::log_debug;
use crate::vim::executor::Executor;
use crate::vim::list::{self, Element};
use crate::vim::{FixtureClient, error::VimError};

/* -------------------------------------------------------------------------- */
/* Argument Struct                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// esxcli command line: namespace path, method name, then flags
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,

    /// Host path expression; must resolve to exactly one object
    #[arg(long, value_name = "PATH")]
    pub host: Option<String>,

    /// Absolute path used as the root for a relative ('.') --host expression
    #[arg(long, value_name = "PATH")]
    pub pivot: Option<String>,

    /// Load parameters from file (JSON or YAML map); command-line flags win
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Target endpoint (fixture file or URL). Falls back to VIMX_TARGET env.
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

/* -------------------------------------------------------------------------- */
/* Public Entry Point                                                         */
/* -------------------------------------------------------------------------- */

pub fn execute_exec(args: ExecArgs) -> Result<()> {
    let mut argv = match expand_command(&args.command) {
        Ok(v) => v,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    if let Some(ref file) = args.param_file
        && let Err(e) = merge_param_file(file, &mut argv)
    {
        return output_error(args.json, &e.to_string());
    }

    let spec = match resolve_target(args.target.as_deref()) {
        Ok(s) => s,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    let client = match connect(&spec) {
        Ok(c) => c,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    let host = match find_host(&client, args.host.as_deref(), args.pivot.as_deref()) {
        Ok(h) => h,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    log_debug!("executing against host {}", host.path);

    let executor = Executor::new(&client, host.object.clone());
    let envelope = match executor.new_request(&argv) {
        Ok(req) => req,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    let response = match executor.execute(&envelope) {
        Ok(res) => res,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "status": "ok",
                "command": envelope.method.trim_start_matches("vim.EsxCLI."),
                "host": host.path,
                "target": spec.original(),
                "payload": response.payload,
            }))?
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{} {} {}",
        color(Role::Accent, "Executed", &style),
        envelope.method.trim_start_matches("vim.EsxCLI."),
        color(Role::Dim, format!("on {}", host.path), &style)
    );
    if response.payload.is_empty() {
        println!("{}", color(Role::Dim, "(empty response)", &style));
    } else {
        println!("{}", response.payload);
    }

    Ok(())
}

/* -------------------------------------------------------------------------- */
/* Command Line Expansion                                                      */
/* -------------------------------------------------------------------------- */

/// A single token containing whitespace is treated as a full shell-quoted
/// command line and split; anything else passes through verbatim.
fn expand_command(tokens: &[String]) -> Result<Vec<String>> {
    if tokens.len() == 1 && tokens[0].contains(char::is_whitespace) {
        return shell_words::split(&tokens[0])
            .context("Failed to split quoted command line (shell splitting)");
    }
    Ok(tokens.to_vec())
}

/// Merge a JSON/YAML map of parameter values into `argv` as flag tokens.
///
/// Entries are inserted before the first user-supplied flag so that explicit
/// command-line flags override file entries (later occurrence wins during
/// coercion). Booleans become bare presence flags; `false` entries are
/// skipped entirely.
fn merge_param_file(file: &str, argv: &mut Vec<String>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read param file: {file}"))?;

    let map: serde_json::Map<String, serde_json::Value> =
        if file.ends_with(".yaml") || file.ends_with(".yml") {
            serde_yaml::from_str(&text)
                .with_context(|| format!("Failed to parse YAML param file: {file}"))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse JSON param file: {file}"))?
        };

    let mut tokens = Vec::new();
    for (name, value) in &map {
        match value {
            serde_json::Value::Bool(true) => tokens.push(format!("-{name}")),
            serde_json::Value::Bool(false) => {}
            serde_json::Value::String(s) => {
                tokens.push(format!("-{name}"));
                tokens.push(s.clone());
            }
            serde_json::Value::Number(n) => {
                tokens.push(format!("-{name}"));
                tokens.push(n.to_string());
            }
            other => bail!("unsupported param file value for '{name}': {other}"),
        }
    }

    let insert_at = argv
        .iter()
        .position(|a| a.starts_with('-'))
        .unwrap_or(argv.len());
    argv.splice(insert_at..insert_at, tokens);
    Ok(())
}

/* -------------------------------------------------------------------------- */
/* Host Selection                                                             */
/* -------------------------------------------------------------------------- */

/// Resolve the execution host.
///
/// With --host the expression must match exactly one object. Without it the
/// default pattern `*/host/*` is searched for host systems; anything other
/// than exactly one is an error asking the user to disambiguate.
fn find_host(
    client: &FixtureClient,
    host: Option<&str>,
    pivot: Option<&str>,
) -> Result<Element, VimError> {
    if let Some(expr) = host {
        return list::resolve_one(client, expr, relative_fn(client, pivot));
    }

    let mut hosts: Vec<Element> = list::list(client, "*/host/*", true, || {
        Err(VimError::Argument("default host lookup is absolute".into()))
    })?
    .into_iter()
    .filter(|e| e.object.kind == "HostSystem")
    .collect();

    match hosts.len() {
        0 => Err(VimError::NoMatch {
            expr: "*/host/*".into(),
        }),
        1 => Ok(hosts.remove(0)),
        count => Err(VimError::Argument(format!(
            "{count} hosts found; specify one with --host"
        ))),
    }
}

/* --------------------------------- Tests ---------------------------------- */
