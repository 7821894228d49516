//! # Dashboard Compiler
//!
//! Compiles a tree of declarative JSON dashboard documents into JSX source
//! files for the opus-ui runtime.
//!
//! ## Compilation Invariants
//!
//! 1. **Deterministic output**: identical input packages produce identical
//!    generated text. Every map the compiler walks preserves insertion
//!    order; path arithmetic is lexical and never touches the filesystem.
//!
//! 2. **Explicit state**: all emission state lives in an [`context::EmitCtx`]
//!    threaded through the recursive walk. One context per output file; only
//!    [`context::CompilerRun`] spans the run.
//!
//! 3. **Main trait**: at most one trait per node supplies the rendered
//!    component type — the first declared reference that resolves,
//!    transitively, to a typed document. All remaining traits contribute
//!    properties only, through the runtime composition helper.
//!
//! 4. **Binding sigils stay symbolic**: `%name%` / `$name$` property values
//!    always compile to `traitPrps.name` references; the compiler never
//!    substitutes concrete values, the runtime does.
//!
//! 5. **Best effort, observed**: missing trait references and unresolvable
//!    component libraries are skipped or sentineled exactly as declared, and
//!    every such skip is recorded as a [`error::Diagnostic`] on the run.

pub mod builders;
pub mod code;
pub mod context;
pub mod document;
pub mod emit;
pub mod error;
pub mod imports;
pub mod ingest;
pub mod lifecycle;
pub mod paths;
pub mod pipeline;
pub mod props;
pub mod traits;

pub use context::CompilerRun;
pub use document::{Document, FileMap};
pub use error::{CompileError, Diagnostic};
pub use imports::{LibraryProbe, NodeModulesProbe, StaticProbe};
pub use pipeline::{compile, compile_package, FsWriter, MemoryWriter, OutputWriter};
