/*!
shared.rs - helpers shared by the subcommands.

Focus:
  - resolve_target: --target flag > VIMX_TARGET env
  - connect: TargetSpec -> FixtureClient (remote endpoints are scaffold only)
  - relative_fn: --pivot expression -> relative-root closure for leading-`.`
  - output_error: uniform error rendering (JSON or colored)
*/

use anyhow::{Context, Result, bail};

use crate::cmd::format::{Role, StyleOptions, color};
use crate::log_debug;
use crate::vim::error::{Result as VimResult, VimError};
use crate::vim::{self, FixtureClient, ObjectRef, TargetSpec, list};

/// Effective target: explicit flag first, then the VIMX_TARGET environment
/// variable. Errors when neither is set.
pub fn resolve_target(flag: Option<&str>) -> Result<TargetSpec> {
    let raw = match flag {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => match std::env::var("VIMX_TARGET") {
            Ok(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => bail!("no target specified (use --target or VIMX_TARGET)"),
        },
    };

    vim::parse_target(&raw).with_context(|| format!("Failed to parse target: '{raw}'"))
}

/// Open the target. Only fixture files are usable today; remote endpoints
/// need a session/transport layer that does not exist yet.
pub fn connect(spec: &TargetSpec) -> Result<FixtureClient> {
    match spec {
        TargetSpec::Fixture { file, .. } => {
            log_debug!("loading fixture target: {}", file.display());
            FixtureClient::from_file(file)
        }
        TargetSpec::RemoteUrl { url, .. } => {
            bail!("remote endpoint '{url}' not implemented yet (use a fixture file)")
        }
    }
}

/// Relative-root closure for path expressions with a leading `.`.
///
/// The pivot expression itself must be absolute and resolve to exactly one
/// object; it is resolved lazily, only when an expression actually pivots.
pub fn relative_fn<'a>(
    client: &'a FixtureClient,
    pivot: Option<&'a str>,
) -> impl FnMut() -> VimResult<ObjectRef> + 'a {
    move || {
        let Some(expr) = pivot else {
            return Err(VimError::Argument(
                "expression is relative ('.') but no --pivot was given".into(),
            ));
        };
        let element = list::resolve_one(client, expr, || {
            Err(VimError::Argument("--pivot cannot itself be relative".into()))
        })?;
        log_debug!("pivot '{}' -> {}", expr, element.path);
        Ok(element.object)
    }
}

/// Print an error in the caller-selected output shape and exit nonzero.
pub fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({ "status": "error", "error": msg })
        );
    } else {
        let style = StyleOptions::detect();
        eprintln!("{} {}", color(Role::Error, "error:", &style), msg);
    }
    std::process::exit(1);
}
