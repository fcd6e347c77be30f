//! Bundle orchestrator owning the ordered asset list and configuration.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::asset::AssetReference;
use crate::error::{BundleError, BundleResult};
use crate::filters::Compressor;
use crate::options::{BundleOption, BundleOptions};
use crate::scanning::scan_matching_files;

/// Collects asset references and compiles them into a single output file.
///
/// Assets are concatenated in insertion order with no separator. Mutators
/// return the bundler so calls can be chained; chaining is a convenience,
/// not a contract.
#[derive(Debug, Default)]
pub struct AssetBundler {
  assets: Vec<AssetReference>,
  options: BundleOptions,
}

impl AssetBundler {
  /// Create a bundler with default options.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a bundler from explicit options, e.g. loaded with
  /// [`BundleOptions::discover`].
  pub fn with_options(options: BundleOptions) -> Self {
    Self {
      assets: Vec::new(),
      options,
    }
  }

  /// Current option values.
  pub fn options(&self) -> &BundleOptions {
    &self.options
  }

  /// Assets queued for compilation, in insertion order.
  pub fn assets(&self) -> &[AssetReference] {
    &self.assets
  }

  /// Append a single file asset; filters are derived from its extension.
  pub fn add_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
    self.assets.push(AssetReference::file(path));
    self
  }

  /// Append every file under `base_dir` whose name matches `pattern`, in
  /// traversal order. Pass `"*"` to match every file.
  ///
  /// Directory components in `pattern` are ignored; see
  /// [`scan_matching_files`] for the exact traversal rules.
  pub fn add_glob(&mut self, base_dir: impl AsRef<Path>, pattern: &str) -> BundleResult<&mut Self> {
    let base_dir = base_dir.as_ref();
    let files = scan_matching_files(base_dir, pattern)?;
    debug!(
      base_dir = %base_dir.display(),
      pattern,
      count = files.len(),
      "expanded glob"
    );
    for file in files {
      self.add_file(file);
    }
    Ok(self)
  }

  /// Append a remote HTTP(S) asset; filters are derived from the apparent
  /// extension of the URL path and content is fetched when the bundle is
  /// compiled.
  pub fn add_remote(&mut self, url: &str) -> BundleResult<&mut Self> {
    self.assets.push(AssetReference::remote(url)?);
    Ok(self)
  }

  /// Override a single option, keeping every other value.
  pub fn set_option(&mut self, option: BundleOption) -> &mut Self {
    self.options.apply(option);
    self
  }

  /// Override several options at once; later values win for repeated keys.
  pub fn set_options(&mut self, options: impl IntoIterator<Item = BundleOption>) -> &mut Self {
    for option in options {
      self.options.apply(option);
    }
    self
  }

  /// Resolve, filter, concatenate, optionally compress, and write the bundle
  /// to `target_path`, replacing any existing file.
  ///
  /// The compressor is derived from the target extension before anything is
  /// resolved, so an unrecognized extension fails without touching the
  /// filesystem. With the `debug` option set (the default) the compression
  /// step is skipped and the concatenated content is written verbatim.
  pub fn compile(&mut self, target_path: impl AsRef<Path>) -> BundleResult<&mut Self> {
    let target = target_path.as_ref();
    let compressor = Compressor::for_target(target)?;

    let mut combined = String::new();
    for asset in &self.assets {
      let mut content = asset.resolve()?;
      debug!(asset = %asset.describe(), bytes = content.len(), "resolved asset");
      for filter in asset.filters() {
        content = filter.apply(&content, &self.options)?;
        debug!(asset = %asset.describe(), filter = %filter, "applied filter");
      }
      combined.push_str(&content);
    }

    let output = if self.options.debug {
      combined
    } else {
      compressor.apply(&combined, &self.options)?
    };

    if let Some(parent) = target.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(|source| BundleError::WriteFailed {
        path: target.to_path_buf(),
        source,
      })?;
    }
    fs::write(target, &output).map_err(|source| BundleError::WriteFailed {
      path: target.to_path_buf(),
      source,
    })?;
    info!(target = %target.display(), bytes = output.len(), "wrote bundle");

    Ok(self)
  }
}
