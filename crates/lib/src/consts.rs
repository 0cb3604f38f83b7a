//! Default values for the generated build file.

/// Oldest ninja release that understands the generated file.
pub const NINJA_REQUIRED_VERSION: &str = "1.5";

pub const DEFAULT_COMPILER: &str = "clang++";
pub const DEFAULT_INSTALL_PATH: &str = "/usr/local/";

pub const DEFAULT_INCLUDE_FLAGS: &str = "-Iinclude -Ideps/catch/include";
pub const DEFAULT_COMPILER_FLAGS: &str = "-Wall -Wextra -Wno-missing-braces -O2 -Wfatal-errors -Werror -std=c++14";
pub const DEFAULT_LINKER_FLAGS: &str = "";

/// Directory scanned for test sources, relative to the working directory.
pub const DEFAULT_SOURCE_ROOT: &str = "test";
pub const DEFAULT_SOURCE_PATTERN: &str = "*.cpp";
pub const SOURCE_EXTENSION: &str = "cpp";
pub const OBJECT_EXTENSION: &str = "o";

/// Ninja `builddir`, also the prefix of every object path.
pub const BUILD_DIR: &str = "obj";

/// Header tree copied by the install edge.
pub const HEADERS_DIR: &str = "include";

pub const TEST_BINARY: &str = "tests";
pub const INSTALL_TARGET: &str = "install";

pub const DEFAULT_OUTPUT_FILE: &str = "build.ninja";

pub const COMPILE_RULE: &str = "cxx";
pub const LINK_RULE: &str = "link";
pub const INSTALL_RULE: &str = "install-headers";
