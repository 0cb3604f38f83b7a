//! Build graph assembly.
//!
//! [`assemble`] turns a configuration and an ordered source listing into a
//! complete [`BuildGraph`] without touching the filesystem. [`generate`] runs
//! discovery first and then assembles, which is what the CLI uses.
//!
//! The shape of the graph is fixed:
//!
//! ```text
//! test/a.cpp     --cxx-->  obj/a.o      \
//! test/sub/b.cpp --cxx-->  obj/sub/b.o  --link--> tests   (default)
//!                          install-headers --> install
//! ```

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BootstrapConfig;
use crate::consts::{COMPILE_RULE, INSTALL_RULE, LINK_RULE};
use crate::discover::{DiscoverError, SourceFile, collect_sources};
use crate::graph::{BuildGraph, GraphError, Rule};
use crate::mapper::MapError;

#[derive(Debug, Error)]
pub enum AssembleError {
  #[error(transparent)]
  Map(#[from] MapError),

  #[error(transparent)]
  Graph(#[from] GraphError),
}

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Discover(#[from] DiscoverError),

  #[error(transparent)]
  Assemble(#[from] AssembleError),
}

fn declare_variables(graph: &mut BuildGraph, config: &BootstrapConfig) -> Result<(), GraphError> {
  graph.variable("ninja_required_version", &config.required_version)?;
  graph.variable("builddir", &config.build_dir)?;
  graph.variable("include_flags", &config.include_flags)?;
  graph.variable("compiler_flags", &config.compiler_flags)?;
  graph.variable("linker_flags", &config.linker_flags)?;
  graph.variable("compiler", &config.compiler)?;
  graph.variable("install_path", &config.install_path)?;
  Ok(())
}

fn declare_rules(graph: &mut BuildGraph, config: &BootstrapConfig) -> Result<(), GraphError> {
  graph.rule(
    Rule::new(COMPILE_RULE, "$compiler -c $compiler_flags $include_flags $in -o $out")
      .with_description("Compiling $in"),
  )?;
  graph.rule(
    Rule::new(LINK_RULE, "$compiler $compiler_flags $linker_flags $in -o $out").with_description("Linking $in"),
  )?;
  graph.rule(Rule::new(INSTALL_RULE, config.install_command()).with_description("Installing headers in $in"))?;
  Ok(())
}

/// Assemble the build graph for `sources`, in the order given.
///
/// Produces one compile edge per source, a single link edge over every
/// object, an input-less install edge, and marks the link output as default.
/// An empty listing still yields a link edge, with no inputs.
pub fn assemble(config: &BootstrapConfig, sources: &[SourceFile]) -> Result<BuildGraph, AssembleError> {
  let mut graph = BuildGraph::new();
  declare_variables(&mut graph, config)?;
  declare_rules(&mut graph, config)?;

  for source in sources {
    graph.add_source(source.path())?;
  }

  let mapper = config.path_mapper();
  let mut objects = Vec::with_capacity(sources.len());
  for source in sources {
    let object = mapper.map(source)?;
    debug!(source = source.path(), object = %object, "compile edge");
    graph.build(COMPILE_RULE, [source.path()], object.as_str())?;
    objects.push(object.into_string());
  }

  if objects.is_empty() {
    warn!(binary = %config.binary_name, "no sources found, link edge has no inputs");
  }
  graph.build(LINK_RULE, &objects, config.binary_name.as_str())?;
  graph.build(INSTALL_RULE, Vec::<String>::new(), config.install_target.as_str())?;
  graph.set_default(config.binary_name.as_str())?;

  info!(
    sources = sources.len(),
    edges = graph.edges().len(),
    default = %config.binary_name,
    "assembled build graph"
  );

  Ok(graph)
}

/// Discover sources under the configured root, then assemble them.
///
/// Discovery finishes completely before assembly starts; if it fails nothing
/// is assembled.
pub fn generate(config: &BootstrapConfig) -> Result<BuildGraph, GenerateError> {
  let sources = collect_sources(&config.source_root, &config.source_pattern)?;
  let graph = assemble(config, &sources)?;
  Ok(graph)
}
