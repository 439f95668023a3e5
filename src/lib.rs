//! # EMBEDSCAN
//!
//! Structural analysis of Go source trees for code generation.
//!
//! A root directory is walked into one [`PackageModel`](core::PackageModel)
//! per directory, each declared type records the types it embeds, and an
//! embedding-reachability query answers which types incorporate a marker
//! type (for example a framework's `Controller`) at any depth and across
//! package boundaries.
//!
//! ```no_run
//! use embedscan::core::{find_types_embedding, ImportResolver, Program, ProgramOptions};
//! use std::path::Path;
//!
//! let (mut program, errors) = Program::load(Path::new("app"), &ProgramOptions::default())?;
//! let resolver = ImportResolver::default();
//! let degraded = program.process_all(&resolver);
//! for record in find_types_embedding(&program, "aahframework.org/aah.Controller")? {
//!     println!("{}.{}", record.import_path, record.name);
//! }
//! # let _ = (errors, degraded);
//! # Ok::<(), embedscan::error::AnalysisError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;
