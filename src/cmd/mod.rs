/*!
Command dispatcher module: module declarations + re-exports only.

Layout:
  src/cmd/
    mod.rs        (this file)
    ls.rs         (LsArgs      + execute_ls)
    methods.rs    (MethodsArgs + execute_methods)
    exec.rs       (ExecArgs    + execute_exec)
    shared.rs     (target resolution, client construction, pivot helper)
    format.rs     (table / color formatting utilities)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that returns `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
*/

pub mod exec;
pub mod format;
pub mod ls;
pub mod methods;
pub mod shared;

pub use exec::{ExecArgs, execute_exec};
pub use ls::{LsArgs, execute_ls};
pub use methods::{MethodsArgs, execute_methods};
