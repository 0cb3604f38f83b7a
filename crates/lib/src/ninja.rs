//! Ninja build file syntax.
//!
//! Serializes a [`BuildGraph`] into the text format read by `ninja`. The output
//! matches what Ninja's own `ninja_syntax` generator would produce for the
//! same calls: paths in build lines are escaped, values are written as is, and
//! lines longer than the wrap width are broken at unescaped spaces with a
//! trailing ` $`.

use crate::graph::{BuildGraph, Rule};

/// Line width at which long lines are wrapped.
pub const DEFAULT_WIDTH: usize = 78;

/// Escape a path for use in a `build` line.
pub fn escape_path(word: &str) -> String {
  word.replace("$ ", "$$ ").replace(' ', "$ ").replace(':', "$:")
}

/// Number of consecutive `$` immediately before `index`.
fn dollars_before(text: &[u8], index: usize) -> usize {
  text[..index].iter().rev().take_while(|&&b| b == b'$').count()
}

/// A space at `index` is breakable unless it is escaped by an odd run of `$`.
fn is_break(text: &[u8], index: usize) -> bool {
  text[index] == b' ' && dollars_before(text, index) % 2 == 0
}

pub struct NinjaWriter {
  output: String,
  width: usize,
}

impl Default for NinjaWriter {
  fn default() -> Self {
    Self::new(DEFAULT_WIDTH)
  }
}

impl NinjaWriter {
  pub fn new(width: usize) -> Self {
    Self {
      output: String::new(),
      width,
    }
  }

  pub fn variable(&mut self, key: &str, value: &str, indent: usize) {
    self.line(&format!("{} = {}", key, value), indent);
  }

  pub fn rule(&mut self, rule: &Rule) {
    self.line(&format!("rule {}", rule.name), 0);
    self.variable("command", &rule.command, 1);
    if let Some(description) = &rule.description {
      self.variable("description", description, 1);
    }
  }

  pub fn build<S: AsRef<str>>(&mut self, output: &str, rule: &str, inputs: &[S]) {
    let mut text = format!("build {}: {}", escape_path(output), rule);
    for input in inputs {
      text.push(' ');
      text.push_str(&escape_path(input.as_ref()));
    }
    self.line(&text, 0);
  }

  pub fn default_target(&mut self, target: &str) {
    self.line(&format!("default {}", target), 0);
  }

  /// Write every declaration of `graph` in order: variables, rules, edges,
  /// then the default target.
  pub fn graph(&mut self, graph: &BuildGraph) {
    for variable in graph.variables() {
      self.variable(&variable.name, &variable.value, 0);
    }
    for rule in graph.rules() {
      self.rule(rule);
    }
    for edge in graph.edges() {
      self.build(&edge.output, &edge.rule, &edge.inputs);
    }
    if let Some(target) = graph.default_target() {
      self.default_target(target);
    }
  }

  pub fn finish(self) -> String {
    self.output
  }

  /// Write `text`, wrapping it when it exceeds the width.
  ///
  /// Width is counted in characters, not bytes.
  fn line(&mut self, text: &str, indent: usize) {
    let mut leading = "  ".repeat(indent);
    let mut text = text;

    while leading.len() + text.chars().count() > self.width {
      // Room left on this line once the ` $` continuation is added.
      let available = self.width.saturating_sub(leading.len() + 2);
      let bytes = text.as_bytes();

      // (column, byte offset) of every space that may be broken on.
      let breaks: Vec<(usize, usize)> = text
        .char_indices()
        .enumerate()
        .filter(|&(_, (offset, _))| is_break(bytes, offset))
        .map(|(column, (offset, _))| (column, offset))
        .collect();

      let split = breaks
        .iter()
        .rev()
        .find(|&&(column, _)| column < available)
        .or_else(|| breaks.iter().find(|&&(column, _)| column >= available));
      let Some(&(_, split)) = split else {
        break;
      };

      self.output.push_str(&leading);
      self.output.push_str(&text[..split]);
      self.output.push_str(" $\n");
      text = &text[split + 1..];
      leading = "  ".repeat(indent + 2);
    }

    self.output.push_str(&leading);
    self.output.push_str(text);
    self.output.push('\n');
  }
}

/// Render `graph` as the contents of a `build.ninja` file.
pub fn to_ninja_string(graph: &BuildGraph) -> String {
  let mut writer = NinjaWriter::default();
  writer.graph(graph);
  writer.finish()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn render(f: impl FnOnce(&mut NinjaWriter)) -> String {
    let mut writer = NinjaWriter::default();
    f(&mut writer);
    writer.finish()
  }

  #[test]
  fn escapes_build_paths() {
    assert_eq!(escape_path("plain/path.o"), "plain/path.o");
    assert_eq!(escape_path("with space.cpp"), "with$ space.cpp");
    assert_eq!(escape_path("c:/x"), "c$:/x");
    assert_eq!(escape_path("a$ b"), "a$$$ b");
  }

  #[test]
  fn variable_with_empty_value_keeps_separator() {
    let out = render(|w| w.variable("linker_flags", "", 0));
    assert_eq!(out, "linker_flags = \n");
  }

  #[test]
  fn rule_is_indented() {
    let rule = Rule::new("cxx", "$compiler -c $in -o $out").with_description("Compiling $in");
    let out = render(|w| w.rule(&rule));
    assert_eq!(
      out,
      "rule cxx\n  command = $compiler -c $in -o $out\n  description = Compiling $in\n"
    );
  }

  #[test]
  fn build_lines() {
    let out = render(|w| {
      w.build("obj/a.o", "cxx", &["test/a.cpp"]);
      w.build("install", "install-headers", &[] as &[&str]);
      w.build("my app", "link", &["obj/a b.o"]);
    });
    assert_eq!(
      out,
      "build obj/a.o: cxx test/a.cpp\nbuild install: install-headers\nbuild my$ app: link obj/a$ b.o\n"
    );
  }

  #[test]
  fn wraps_long_lines_at_last_space() {
    let out = render(|w| {
      w.variable(
        "compiler_flags",
        "-Wall -Wextra -Wno-missing-braces -O2 -Wfatal-errors -Werror -std=c++14",
        0,
      )
    });
    assert_eq!(
      out,
      "compiler_flags = -Wall -Wextra -Wno-missing-braces -O2 -Wfatal-errors $\n    -Werror -std=c++14\n"
    );
  }

  #[test]
  fn width_counts_characters() {
    let value = format!("{} {}", "é".repeat(35), "ü".repeat(35));
    let out = render(|w| w.variable("k", &value, 0));
    assert_eq!(out, format!("k = {}\n", value));

    let long = format!("{} {}", "é".repeat(40), "ü".repeat(40));
    let out = render(|w| w.variable("k", &long, 0));
    assert_eq!(out, format!("k = {} $\n    {}\n", "é".repeat(40), "ü".repeat(40)));
  }

  #[test]
  fn wrapped_lines_fit_width() {
    let inputs: Vec<String> = (0..40).map(|i| format!("obj/file{}.o", i)).collect();
    let out = render(|w| w.build("tests", "link", &inputs));

    for line in out.lines() {
      assert!(line.len() <= DEFAULT_WIDTH, "line too long: {line:?}");
    }
    let joined = out.replace(" $\n    ", " ");
    assert_eq!(joined, format!("build tests: link {}\n", inputs.join(" ")));
  }

  #[test]
  fn never_breaks_on_escaped_space() {
    let mut writer = NinjaWriter::new(20);
    writer.build("out", "r", &["aaaa bbbb cccc dddd"]);
    let out = writer.finish();

    assert_eq!(out, "build out: r $\n    aaaa$ bbbb$ cccc$ dddd\n");
  }

  #[test]
  fn overlong_word_stays_on_one_line() {
    let long = "x".repeat(100);
    let out = render(|w| w.default_target(&long));
    assert_eq!(out, format!("default $\n    {}\n", long));
  }

  #[test]
  fn breaks_after_width_when_nothing_fits() {
    let mut writer = NinjaWriter::new(10);
    writer.variable("k", &format!("{} tail", "y".repeat(12)), 0);
    let out = writer.finish();
    assert_eq!(out, format!("k = $\n    {} $\n    tail\n", "y".repeat(12)));
  }
}
