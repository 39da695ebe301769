//! Escape Scaffold
//!
//! Clones boilerplate or team repositories and runs whatever installers the
//! checked-out project asks for.
//!
//! # Flow
//!
//! ```text
//! verify target absent → git clone → detect markers → BootstrapPlan → Bootstrapper
//!                                         ↑                              ↓
//!                              package.json, composer.json,      npm / composer / git
//!                              storage/, .git, ...                (first failure stops)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use escape_scaffold::{Boilerplate, ScaffoldConfig, Scaffolder, ShellRunner};
//!
//! let mut scaffolder = Scaffolder::new(ScaffoldConfig::new(), ShellRunner);
//! let report = scaffolder.install_app(&std::env::current_dir()?, "blog", Boilerplate::Laravel)?;
//! println!("created {}", report.directory.display());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod plan;
pub mod project;
pub mod runner;
pub mod scaffolder;

pub use bootstrap::Bootstrapper;
pub use config::ScaffoldConfig;
pub use error::{Result, ScaffoldError};
pub use plan::{Action, BootstrapPlan, Profile, Step};
pub use project::{validate_name, verify_target_absent, Boilerplate};
pub use runner::{CommandRunner, ShellRunner, SIGNALLED};
pub use scaffolder::{ScaffoldReport, Scaffolder};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
