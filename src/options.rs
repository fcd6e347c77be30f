//! Bundle option defaults, overrides, and options-file loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_OPTIONS_FILE: &str = "bundler.config.json";

/// Configuration consulted while compiling a bundle.
///
/// Defaults point at the conventional install locations of the external
/// processors. Every field can be overridden through [`BundleOption`] values
/// or an options file; overrides replace individual fields, never reset the
/// rest.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleOptions {
    /// When set, the final compression step is skipped and the concatenated
    /// content is written verbatim.
    pub debug: bool,
    /// Path to the external Sass/Scss processor binary.
    pub sass_compiler_path: PathBuf,
    /// Path to the external Less processor binary.
    pub less_compiler_path: PathBuf,
    /// Path to the external CoffeeScript processor binary.
    pub coffee_compiler_path: PathBuf,
    /// JVM binary used to run the compressor jars.
    pub java_path: PathBuf,
    /// Jar implementing the JS minifier.
    pub closure_compiler_jar_path: PathBuf,
    /// Jar implementing the CSS compressor.
    pub yui_compressor_jar_path: PathBuf,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            debug: true,
            sass_compiler_path: "/usr/bin/sass".into(),
            less_compiler_path: "/usr/bin/lessc".into(),
            coffee_compiler_path: "/usr/bin/coffee".into(),
            java_path: "/usr/bin/java".into(),
            closure_compiler_jar_path: "/usr/share/closure-compiler/compiler.jar".into(),
            yui_compressor_jar_path: "/usr/share/yui-compressor/yui-compressor.jar".into(),
        }
    }
}

/// Single option override applied with [`BundleOptions::apply`].
#[derive(Debug, Clone)]
pub enum BundleOption {
    /// Override the `debug` flag.
    Debug(bool),
    /// Override the Sass/Scss processor path.
    SassCompilerPath(PathBuf),
    /// Override the Less processor path.
    LessCompilerPath(PathBuf),
    /// Override the CoffeeScript processor path.
    CoffeeCompilerPath(PathBuf),
    /// Override the JVM binary path.
    JavaPath(PathBuf),
    /// Override the JS minifier jar path.
    ClosureCompilerJarPath(PathBuf),
    /// Override the CSS compressor jar path.
    YuiCompressorJarPath(PathBuf),
}

impl BundleOptions {
    /// Merge one override into the options, keeping every other field.
    pub fn apply(&mut self, option: BundleOption) {
        match option {
            BundleOption::Debug(value) => self.debug = value,
            BundleOption::SassCompilerPath(path) => self.sass_compiler_path = path,
            BundleOption::LessCompilerPath(path) => self.less_compiler_path = path,
            BundleOption::CoffeeCompilerPath(path) => self.coffee_compiler_path = path,
            BundleOption::JavaPath(path) => self.java_path = path,
            BundleOption::ClosureCompilerJarPath(path) => self.closure_compiler_jar_path = path,
            BundleOption::YuiCompressorJarPath(path) => self.yui_compressor_jar_path = path,
        }
    }

    /// Attempt to load options from the provided directory.
    ///
    /// When the options file does not exist or fails to parse we fall back to
    /// default values so downstream callers can continue operating with
    /// sensible assumptions.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_OPTIONS_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read options from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }
}
