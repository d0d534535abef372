/*!
`ls.rs`

Implements the `ls` subcommand: resolve one or more inventory path
expressions and print the matched elements.

Behavior:
  - No expressions given: lists the global root contents (`/`).
  - Globs (`*`, `?`) match child names segment by segment; a bare container
    path expands to its contents unless --traverse-leafs is set.
  - Expressions starting with `.` resolve relative to --pivot.
  - Zero matches is an empty listing, not an error.

JSON Output Shape:
{
  "status": "ok",
  "target": "<target>",
  "count": 2,
  "elements": [
    { "path": "/dc/host/esx-1.local", "kind": "HostSystem" }
  ]
}
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, color, table};
use crate::cmd::shared::{connect, output_error, relative_fn, resolve_target};
use crate::log_debug;
use crate::vim::list;

/// CLI arguments for `vimx ls [PATH...]`
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Inventory path expressions (default: "/")
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Show object kind alongside each path
    #[arg(short = 'l', long)]
    pub long: bool,

    /// Match trailing containers themselves instead of expanding contents
    #[arg(long)]
    pub traverse_leafs: bool,

    /// Absolute path used as the root for relative ('.') expressions
    #[arg(long, value_name = "PATH")]
    pub pivot: Option<String>,

    /// Target endpoint (fixture file or URL). Falls back to VIMX_TARGET env.
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

/// Entry point for the ls subcommand.
pub fn execute_ls(args: LsArgs) -> Result<()> {
    let spec = match resolve_target(args.target.as_deref()) {
        Ok(s) => s,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    let client = match connect(&spec) {
        Ok(c) => c,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    let exprs = if args.paths.is_empty() {
        vec!["/".to_string()]
    } else {
        args.paths.clone()
    };
    log_debug!("resolving {} expression(s)", exprs.len());

    let elements = match list::list_slice(
        &client,
        &exprs,
        args.traverse_leafs,
        relative_fn(&client, args.pivot.as_deref()),
    ) {
        Ok(es) => es,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    if args.json {
        let items: Vec<_> = elements
            .iter()
            .map(|e| {
                serde_json::json!({
                    "path": e.path,
                    "kind": e.object.kind,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "status": "ok",
                "target": spec.original(),
                "count": elements.len(),
                "elements": items,
            }))?
        );
        return Ok(());
    }

    if args.long {
        let style = StyleOptions::detect();
        let rows: Vec<Vec<String>> = elements
            .iter()
            .map(|e| vec![e.path.clone(), e.object.kind.clone()])
            .collect();
        println!("{}", table(&["PATH", "KIND"], &rows, &style));
        println!(
            "{}",
            color(Role::Dim, format!("{} element(s)", elements.len()), &style)
        );
    } else {
        for e in &elements {
            println!("{}", e.path);
        }
    }

    Ok(())
}
