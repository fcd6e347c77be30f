//! Extension-keyed transform filters and whole-bundle compressors.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use crate::error::{BundleError, BundleResult};
use crate::exec::run_piped;
use crate::options::BundleOptions;

/// Per-asset content transform selected by the source file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformFilter {
    /// Sass (indented syntax) to CSS.
    Sass,
    /// Scss to CSS.
    Scss,
    /// Less to CSS.
    Less,
    /// CoffeeScript to JS.
    CoffeeScript,
}

/// Returns the filter chain for a source file extension.
///
/// Unrecognized and missing extensions map to an empty chain and the content
/// passes through unchanged. Matching is case-sensitive.
pub fn filters_for_extension(extension: Option<&str>) -> Vec<TransformFilter> {
    match extension {
        Some("sass") => vec![TransformFilter::Sass],
        Some("scss") => vec![TransformFilter::Scss],
        Some("less") => vec![TransformFilter::Less],
        Some("coffee") => vec![TransformFilter::CoffeeScript],
        _ => Vec::new(),
    }
}

impl TransformFilter {
    /// Transform `input` by piping it through the configured external binary.
    pub fn apply(&self, input: &str, options: &BundleOptions) -> BundleResult<String> {
        let (program, args) = self.command(options);
        run_piped(program, args, input).map_err(|source| BundleError::FilterExecution {
            filter: self.to_string(),
            source,
        })
    }

    fn command<'a>(&self, options: &'a BundleOptions) -> (&'a Path, &'static [&'static str]) {
        match self {
            Self::Sass => (&options.sass_compiler_path, &["--stdin"]),
            Self::Scss => (&options.sass_compiler_path, &["--scss", "--stdin"]),
            Self::Less => (&options.less_compiler_path, &["-"]),
            Self::CoffeeScript => (&options.coffee_compiler_path, &["--stdio", "--print"]),
        }
    }
}

impl fmt::Display for TransformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sass => "sass",
            Self::Scss => "scss",
            Self::Less => "less",
            Self::CoffeeScript => "coffee",
        };
        f.write_str(name)
    }
}

/// Whole-bundle minifier selected by the compile target's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compressor {
    /// YUI Compressor in CSS mode.
    Css,
    /// Closure Compiler.
    Js,
}

impl Compressor {
    /// Derive the compressor from the target path's extension.
    pub fn for_target(target: &Path) -> BundleResult<Self> {
        match target.extension().and_then(|ext| ext.to_str()) {
            Some("css") => Ok(Self::Css),
            Some("js") => Ok(Self::Js),
            _ => Err(BundleError::InvalidTargetExtension {
                path: target.to_path_buf(),
            }),
        }
    }

    /// Compress `input` by piping it through the configured jar.
    pub fn apply(&self, input: &str, options: &BundleOptions) -> BundleResult<String> {
        let args = self.jar_args(options);
        run_piped(&options.java_path, &args, input).map_err(|source| {
            BundleError::FilterExecution {
                filter: self.to_string(),
                source,
            }
        })
    }

    fn jar_args(&self, options: &BundleOptions) -> Vec<OsString> {
        match self {
            Self::Css => vec![
                OsString::from("-jar"),
                options.yui_compressor_jar_path.clone().into_os_string(),
                OsString::from("--type"),
                OsString::from("css"),
            ],
            Self::Js => vec![
                OsString::from("-jar"),
                options.closure_compiler_jar_path.clone().into_os_string(),
            ],
        }
    }
}

impl fmt::Display for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Css => "yui-css-compressor",
            Self::Js => "closure-js-compressor",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_extensions_to_filter_chains() {
        assert_eq!(filters_for_extension(Some("sass")), vec![TransformFilter::Sass]);
        assert_eq!(filters_for_extension(Some("scss")), vec![TransformFilter::Scss]);
        assert_eq!(filters_for_extension(Some("less")), vec![TransformFilter::Less]);
        assert_eq!(
            filters_for_extension(Some("coffee")),
            vec![TransformFilter::CoffeeScript]
        );
    }

    #[test]
    fn passes_other_extensions_through_unfiltered() {
        assert!(filters_for_extension(Some("css")).is_empty());
        assert!(filters_for_extension(Some("js")).is_empty());
        assert!(filters_for_extension(None).is_empty());
        // Matching is case-sensitive.
        assert!(filters_for_extension(Some("SASS")).is_empty());
    }

    #[test]
    fn derives_compressor_from_target_extension() {
        assert_eq!(Compressor::for_target(Path::new("out.css")).unwrap(), Compressor::Css);
        assert_eq!(Compressor::for_target(Path::new("out.js")).unwrap(), Compressor::Js);
    }

    #[test]
    fn rejects_unknown_target_extensions() {
        let err = Compressor::for_target(Path::new("out.xyz")).unwrap_err();
        assert!(matches!(err, BundleError::InvalidTargetExtension { .. }));

        let err = Compressor::for_target(Path::new("out")).unwrap_err();
        assert!(matches!(err, BundleError::InvalidTargetExtension { .. }));
    }

    #[cfg(unix)]
    mod with_fake_binaries {
        use super::*;
        use std::fs;
        use std::path::PathBuf;
        use tempfile::tempdir;

        fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
            use std::os::unix::fs::PermissionsExt;

            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn applies_filter_via_configured_binary() {
            let dir = tempdir().unwrap();
            let script = write_script(dir.path(), "sass", "printf 'compiled:'; cat");

            let options = BundleOptions {
                sass_compiler_path: script,
                ..BundleOptions::default()
            };

            let output = TransformFilter::Sass.apply("body\n", &options).unwrap();
            assert_eq!(output, "compiled:body\n");
        }

        #[test]
        fn reports_failing_filter_process() {
            let dir = tempdir().unwrap();
            let script = write_script(dir.path(), "sass", "echo 'boom' >&2; exit 3");

            let options = BundleOptions {
                sass_compiler_path: script,
                ..BundleOptions::default()
            };

            let err = TransformFilter::Sass.apply("", &options).unwrap_err();
            assert!(matches!(err, BundleError::FilterExecution { .. }));
        }

        #[test]
        fn css_compressor_runs_yui_jar() {
            let dir = tempdir().unwrap();
            let java = write_script(dir.path(), "java", r#"printf '%s ' "$@""#);

            let options = BundleOptions {
                java_path: java,
                yui_compressor_jar_path: "/opt/yui.jar".into(),
                ..BundleOptions::default()
            };

            let output = Compressor::Css.apply("", &options).unwrap();
            assert_eq!(output.trim(), "-jar /opt/yui.jar --type css");
        }

        #[test]
        fn js_compressor_runs_closure_jar() {
            let dir = tempdir().unwrap();
            let java = write_script(dir.path(), "java", r#"printf '%s ' "$@""#);

            let options = BundleOptions {
                java_path: java,
                closure_compiler_jar_path: "/opt/closure.jar".into(),
                ..BundleOptions::default()
            };

            let output = Compressor::Js.apply("", &options).unwrap();
            assert_eq!(output.trim(), "-jar /opt/closure.jar");
        }
    }
}
