//! In-memory build graph.
//!
//! The graph holds variables, rule templates, build edges and the default
//! target in declaration order. It is append-only: every method adds one
//! entry after checking it against what is already there, and nothing is ever
//! revised. That keeps the following true for any graph that was built
//! without error:
//!
//! - variable and rule names are unique;
//! - an edge only uses a rule declared before it;
//! - every edge input is a registered source or the output of an earlier edge,
//!   so edges are always in a valid topological order;
//! - each output has exactly one producer;
//! - the default target is the output of some edge.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  #[error("variable already declared: {0}")]
  DuplicateVariable(String),

  #[error("rule already declared: {0}")]
  DuplicateRule(String),

  #[error("edge for {output} uses undeclared rule {rule}")]
  UnknownRule { rule: String, output: String },

  #[error("edge for {output} consumes {input}, which is neither a source nor an earlier output")]
  DanglingInput { input: String, output: String },

  #[error("{0} is produced more than once")]
  DuplicateOutput(String),

  #[error("default target {0} is not produced by any edge")]
  UnknownDefault(String),

  #[error("default target already set to {0}")]
  DuplicateDefault(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
  pub name: String,
  pub value: String,
}

/// A rule template. `$in`, `$out` and declared variables are expanded by the
/// executor, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
  pub name: String,
  pub command: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl Rule {
  pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      command: command.into(),
      description: None,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}

/// One instantiation of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildEdge {
  pub rule: String,
  pub inputs: Vec<String>,
  pub output: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildGraph {
  variables: Vec<Variable>,
  rules: Vec<Rule>,
  sources: Vec<String>,
  edges: Vec<BuildEdge>,
  default_target: Option<String>,

  #[serde(skip)]
  known_sources: HashSet<String>,
  #[serde(skip)]
  outputs: HashSet<String>,
}

impl BuildGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declare a graph-wide variable.
  pub fn variable(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), GraphError> {
    let name = name.into();
    if self.variables.iter().any(|v| v.name == name) {
      return Err(GraphError::DuplicateVariable(name));
    }
    self.variables.push(Variable {
      name,
      value: value.into(),
    });
    Ok(())
  }

  pub fn rule(&mut self, rule: Rule) -> Result<(), GraphError> {
    if self.has_rule(&rule.name) {
      return Err(GraphError::DuplicateRule(rule.name));
    }
    self.rules.push(rule);
    Ok(())
  }

  /// Register a file that exists on disk and may be consumed by edges.
  ///
  /// Registering the same source twice is a no-op.
  pub fn add_source(&mut self, path: impl Into<String>) -> Result<(), GraphError> {
    let path = path.into();
    if self.outputs.contains(&path) {
      return Err(GraphError::DuplicateOutput(path));
    }
    if self.known_sources.insert(path.clone()) {
      self.sources.push(path);
    }
    Ok(())
  }

  /// Append an edge producing `output` from `inputs` with `rule`.
  pub fn build<I, S>(&mut self, rule: &str, inputs: I, output: impl Into<String>) -> Result<&BuildEdge, GraphError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let output = output.into();

    if !self.has_rule(rule) {
      return Err(GraphError::UnknownRule {
        rule: rule.to_string(),
        output,
      });
    }

    let inputs: Vec<String> = inputs.into_iter().map(Into::into).collect();
    if let Some(input) = inputs
      .iter()
      .find(|input| !self.known_sources.contains(*input) && !self.outputs.contains(*input))
    {
      return Err(GraphError::DanglingInput {
        input: input.clone(),
        output,
      });
    }

    if self.outputs.contains(&output) || self.known_sources.contains(&output) {
      return Err(GraphError::DuplicateOutput(output));
    }

    self.outputs.insert(output.clone());
    self.edges.push(BuildEdge {
      rule: rule.to_string(),
      inputs,
      output,
    });
    Ok(&self.edges[self.edges.len() - 1])
  }

  /// Designate the target built when none is requested.
  pub fn set_default(&mut self, target: impl Into<String>) -> Result<(), GraphError> {
    let target = target.into();
    if let Some(existing) = &self.default_target {
      return Err(GraphError::DuplicateDefault(existing.clone()));
    }
    if !self.outputs.contains(&target) {
      return Err(GraphError::UnknownDefault(target));
    }
    self.default_target = Some(target);
    Ok(())
  }

  pub fn variables(&self) -> &[Variable] {
    &self.variables
  }

  pub fn variable_value(&self, name: &str) -> Option<&str> {
    self.variables.iter().find(|v| v.name == name).map(|v| v.value.as_str())
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn has_rule(&self, name: &str) -> bool {
    self.rules.iter().any(|r| r.name == name)
  }

  pub fn sources(&self) -> &[String] {
    &self.sources
  }

  pub fn edges(&self) -> &[BuildEdge] {
    &self.edges
  }

  /// Edges instantiating `rule`, in declaration order.
  pub fn edges_for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a BuildEdge> + 'a {
    self.edges.iter().filter(move |e| e.rule == rule)
  }

  pub fn default_target(&self) -> Option<&str> {
    self.default_target.as_deref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn graph_with_rules() -> BuildGraph {
    let mut graph = BuildGraph::new();
    graph.rule(Rule::new("cc", "cc -c $in -o $out")).unwrap();
    graph.rule(Rule::new("ld", "cc $in -o $out")).unwrap();
    graph
  }

  #[test]
  fn edges_keep_declaration_order() {
    let mut graph = graph_with_rules();
    graph.add_source("b.c").unwrap();
    graph.add_source("a.c").unwrap();
    graph.build("cc", ["b.c"], "b.o").unwrap();
    graph.build("cc", ["a.c"], "a.o").unwrap();
    graph.build("ld", ["b.o", "a.o"], "app").unwrap();
    graph.set_default("app").unwrap();

    let outputs: Vec<_> = graph.edges().iter().map(|e| e.output.as_str()).collect();
    assert_eq!(outputs, vec!["b.o", "a.o", "app"]);
    assert_eq!(graph.edges()[2].inputs, vec!["b.o", "a.o"]);
    assert_eq!(graph.default_target(), Some("app"));
    assert_eq!(graph.edges_for_rule("cc").count(), 2);
  }

  #[test]
  fn duplicate_names_are_rejected() {
    let mut graph = graph_with_rules();
    graph.variable("cflags", "-O2").unwrap();

    assert_eq!(
      graph.variable("cflags", "-O0"),
      Err(GraphError::DuplicateVariable("cflags".to_string()))
    );
    assert_eq!(
      graph.rule(Rule::new("cc", "other")),
      Err(GraphError::DuplicateRule("cc".to_string()))
    );
    assert_eq!(graph.variable_value("cflags"), Some("-O2"));
  }

  #[test]
  fn unknown_rule_is_rejected() {
    let mut graph = BuildGraph::new();
    let err = graph.build("cc", Vec::<String>::new(), "x").unwrap_err();
    assert!(matches!(err, GraphError::UnknownRule { .. }));
    assert!(graph.edges().is_empty());
  }

  #[test]
  fn dangling_input_is_rejected() {
    let mut graph = graph_with_rules();
    let err = graph.build("ld", ["missing.o"], "app").unwrap_err();
    assert_eq!(
      err,
      GraphError::DanglingInput {
        input: "missing.o".to_string(),
        output: "app".to_string(),
      }
    );
  }

  #[test]
  fn consumer_before_producer_is_rejected() {
    let mut graph = graph_with_rules();
    graph.add_source("a.c").unwrap();

    assert!(graph.build("ld", ["a.o"], "app").is_err());
    graph.build("cc", ["a.c"], "a.o").unwrap();
    assert!(graph.build("ld", ["a.o"], "app").is_ok());
  }

  #[test]
  fn second_producer_is_rejected() {
    let mut graph = graph_with_rules();
    graph.add_source("a.c").unwrap();
    graph.add_source("sub/a.c").unwrap();
    graph.build("cc", ["a.c"], "a.o").unwrap();

    assert_eq!(
      graph.build("cc", ["sub/a.c"], "a.o").unwrap_err(),
      GraphError::DuplicateOutput("a.o".to_string())
    );
    assert_eq!(
      graph.build("cc", ["a.c"], "a.c").unwrap_err(),
      GraphError::DuplicateOutput("a.c".to_string())
    );
  }

  #[test]
  fn edges_without_inputs_are_allowed() {
    let mut graph = graph_with_rules();
    let edge = graph.build("ld", Vec::<String>::new(), "app").unwrap();
    assert!(edge.inputs.is_empty());
  }

  #[test]
  fn default_must_be_a_single_known_output() {
    let mut graph = graph_with_rules();
    assert_eq!(
      graph.set_default("app"),
      Err(GraphError::UnknownDefault("app".to_string()))
    );

    graph.build("ld", Vec::<String>::new(), "app").unwrap();
    graph.build("ld", Vec::<String>::new(), "other").unwrap();
    graph.set_default("app").unwrap();
    assert_eq!(
      graph.set_default("other"),
      Err(GraphError::DuplicateDefault("app".to_string()))
    );
    assert_eq!(graph.default_target(), Some("app"));
  }

  #[test]
  fn sources_are_registered_once() {
    let mut graph = BuildGraph::new();
    graph.add_source("a.c").unwrap();
    graph.add_source("a.c").unwrap();
    assert_eq!(graph.sources(), ["a.c".to_string()]);
  }

  #[test]
  fn serializes_without_lookup_sets() {
    let mut graph = graph_with_rules();
    graph.build("ld", Vec::<String>::new(), "app").unwrap();

    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(json["edges"][0]["output"], "app");
    assert!(json.get("outputs").is_none());
    assert!(json.get("known_sources").is_none());
  }
}
