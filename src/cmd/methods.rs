/*!
`methods.rs`

Implements the `methods` subcommand: fetch the dynamic method catalog for an
esxcli namespace (via the CLI info describe call) and print each method with
its parameter schema.

JSON Output Shape:
{
  "status": "ok",
  "namespace": "network.vm",
  "target": "<target>",
  "count": 1,
  "methods": [
    { "name": "list", "params": [ { "name": "vm-id", "wire_type": "string" } ] }
  ]
}
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, color, table};
use crate::cmd::shared::{connect, output_error, resolve_target};
use crate::vim::Inventory;
use crate::vim::executor::Executor;

/// CLI arguments for `vimx methods NAMESPACE`
#[derive(Args, Debug)]
pub struct MethodsArgs {
    /// Dotted esxcli namespace (e.g. "network.vm")
    #[arg(value_name = "NAMESPACE")]
    pub namespace: String,

    /// Target endpoint (fixture file or URL). Falls back to VIMX_TARGET env.
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

/// Entry point for the methods subcommand.
pub fn execute_methods(args: MethodsArgs) -> Result<()> {
    let namespace = args.namespace.trim();
    if namespace.is_empty() {
        return output_error(args.json, "namespace cannot be empty");
    }

    let spec = match resolve_target(args.target.as_deref()) {
        Ok(s) => s,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    let client = match connect(&spec) {
        Ok(c) => c,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    let executor = Executor::new(&client, client.global_root());
    let catalog = match executor.namespace_info(namespace) {
        Ok(c) => c,
        Err(e) => return output_error(args.json, &e.to_string()),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "status": "ok",
                "namespace": namespace,
                "target": spec.original(),
                "count": catalog.methods.len(),
                "methods": catalog.methods,
            }))?
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{} {}",
        color(Role::Accent, "Namespace:", &style),
        namespace
    );

    if catalog.methods.is_empty() {
        println!(
            "{}",
            color(Role::Dim, "No methods known in this namespace", &style)
        );
        return Ok(());
    }

    let rows: Vec<Vec<String>> = catalog
        .methods
        .iter()
        .map(|m| {
            let params: Vec<String> = m
                .params
                .iter()
                .map(|p| format!("{}:{:?}", p.name, p.wire_type).to_lowercase())
                .collect();
            vec![m.name.clone(), params.join(", ")]
        })
        .collect();
    println!("{}", table(&["METHOD", "PARAMS"], &rows, &style));

    Ok(())
}
