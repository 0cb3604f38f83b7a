//! ninja-bootstrap-lib: build file generation for C++ test suites
//!
//! This crate discovers test sources and turns them into a Ninja build file:
//! - `discover`: glob-based source discovery over a directory tree
//! - `mapper`: source path to object path mapping
//! - `graph`: the append-only build graph (variables, rules, edges, default)
//! - `assemble`: builds the graph from a configuration and a source listing
//! - `ninja`: serializes the graph in Ninja syntax
//! - `emit`: atomic write of the result

pub mod assemble;
pub mod config;
pub mod consts;
pub mod discover;
pub mod emit;
pub mod graph;
pub mod mapper;
pub mod ninja;

pub use assemble::{AssembleError, GenerateError, assemble, generate};
pub use config::BootstrapConfig;
pub use discover::{DiscoverError, GlobMatcher, SourceFile, collect_sources, discover};
pub use emit::{WriteError, write_atomic, write_build_file};
pub use graph::{BuildEdge, BuildGraph, GraphError, Rule, Variable};
pub use mapper::{ArtifactPath, MapError, PathMapper};
pub use ninja::to_ninja_string;
