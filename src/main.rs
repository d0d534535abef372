use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod utils;
mod vim;

use cmd::{ExecArgs, LsArgs, MethodsArgs};

/// vimx - vSphere inventory traversal and dynamic esxcli execution
///
/// Command layout:
///   vimx ls      [PATH...] [--long] [--pivot PATH] [-t "<target>"] [--json]
///   vimx methods NAMESPACE [-t "<target>"] [--json]
///   vimx exec    [--host PATH] [-t "<target>"] [--json] <esxcli command line>
///                (flags go before the command line; everything after the
///                 first command token is passed to the remote method)
///
/// Global flags / env:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///   -t / --target   Default target; VIMX_TARGET env fallback if -t omitted
///
/// Target kinds:
///   Fixture file (JSON inventory + esxcli catalog): fully supported
///   Remote URL (http/https vSphere endpoint): placeholder only
///
/// Path expressions:
///   Segments are globs (`*` any run, `?` one char); a bare container path
///   lists its contents; a leading `.` pivots onto --pivot; `..` is rejected.
///
/// Examples:
///   vimx ls 'ha-datacenter/host/*' -t lab.json --long
///   vimx ls './esx-*' --pivot ha-datacenter/host -t lab.json
///   vimx methods system.settings.advanced -t lab.json
///   vimx exec -t lab.json --host 'ha-datacenter/host/esx-1.local' \
///       "system settings advanced set -o /Net/GuestIPHack -i 1"
#[derive(Parser, Debug)]
#[command(
    name = "vimx",
    version,
    author,
    about = "vimx - vSphere inventory traversal and dynamic esxcli execution",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Default target (fixture file or remote URL)
    #[arg(short = 't', long = "target", global = true, value_name = "TARGET")]
    target: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve inventory path expressions and list matched objects
    Ls(LsArgs),

    /// List the method catalog of an esxcli namespace
    Methods(MethodsArgs),

    /// Execute a dynamically-discovered esxcli command
    Exec(ExecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // Determine effective global target (CLI flag > VIMX_TARGET env)
    let global_target = cli.target.clone().or_else(|| {
        std::env::var("VIMX_TARGET")
            .ok()
            .filter(|s| !s.trim().is_empty())
    });

    // Validate if present
    if let Some(t) = &global_target
        && let Err(e) = vim::parse_target(t)
    {
        eprintln!("Invalid target '{}': {e}", t);
        std::process::exit(2);
    }

    match cli.command {
        Commands::Ls(mut args) => {
            if args.target.is_none() {
                args.target = global_target.clone();
            }
            cmd::execute_ls(args)
        }
        Commands::Methods(mut args) => {
            if args.target.is_none() {
                args.target = global_target.clone();
            }
            cmd::execute_methods(args)
        }
        Commands::Exec(mut args) => {
            if args.target.is_none() {
                args.target = global_target.clone();
            }
            cmd::execute_exec(args)
        }
    }
}
