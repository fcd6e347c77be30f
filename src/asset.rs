//! Asset references resolved from disk or over HTTP.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use url::Url;

use crate::error::{BundleError, BundleResult};
use crate::filters::{TransformFilter, filters_for_extension};

fn remote_reference_pattern() -> &'static Regex {
  use std::sync::OnceLock;

  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)^https?://").expect("invalid http(s) regex"))
}

/// Determine whether a reference names a remote HTTP(S) resource.
///
/// Only http(s) URLs can be fetched at resolve time; everything else is
/// treated as a local path.
pub fn is_remote_reference(value: &str) -> bool {
  remote_reference_pattern().is_match(value)
}

/// Location an asset's content is read from.
#[derive(Debug, Clone)]
pub enum AssetSource {
  /// Literal file path on the local filesystem.
  File(PathBuf),
  /// Remote HTTP(S) resource fetched at resolve time.
  Remote(Url),
}

/// One input destined for the bundle, with its extension-derived filter chain.
///
/// The filter chain is fixed when the reference is created; the binaries the
/// filters invoke are read from the bundle options at compile time.
#[derive(Debug, Clone)]
pub struct AssetReference {
  source: AssetSource,
  filters: Vec<TransformFilter>,
}

impl AssetReference {
  /// Reference a local file, deriving filters from its extension.
  pub fn file(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let filters = filters_for_extension(path.extension().and_then(|ext| ext.to_str()));
    Self {
      source: AssetSource::File(path),
      filters,
    }
  }

  /// Reference a remote HTTP(S) resource, deriving filters from the apparent
  /// extension of the URL path; query and fragment are ignored.
  pub fn remote(url: &str) -> BundleResult<Self> {
    let parsed = parse_remote_url(url).map_err(|source| BundleError::AssetResolution {
      asset: url.to_string(),
      source,
    })?;
    let filters =
      filters_for_extension(Path::new(parsed.path()).extension().and_then(|ext| ext.to_str()));
    Ok(Self {
      source: AssetSource::Remote(parsed),
      filters,
    })
  }

  /// Filters applied to this asset's content, in order.
  pub fn filters(&self) -> &[TransformFilter] {
    &self.filters
  }

  /// Where this asset's content comes from.
  pub fn source(&self) -> &AssetSource {
    &self.source
  }

  /// Human readable identity used in logs and error messages.
  pub fn describe(&self) -> String {
    match &self.source {
      AssetSource::File(path) => path.display().to_string(),
      AssetSource::Remote(url) => url.to_string(),
    }
  }

  /// Read or fetch the asset's raw content.
  pub fn resolve(&self) -> BundleResult<String> {
    let content = match &self.source {
      AssetSource::File(path) => {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
      }
      AssetSource::Remote(url) => fetch_remote(url),
    };

    content.map_err(|source| BundleError::AssetResolution {
      asset: self.describe(),
      source,
    })
  }
}

fn parse_remote_url(value: &str) -> Result<Url> {
  if !is_remote_reference(value) {
    return Err(anyhow!("remote assets must use an http(s) URL"));
  }
  Url::parse(value).with_context(|| format!("failed to parse URL `{value}`"))
}

fn fetch_remote(url: &Url) -> Result<String> {
  let response = reqwest::blocking::get(url.as_str())
    .with_context(|| format!("failed to fetch {url}"))?
    .error_for_status()
    .with_context(|| format!("{url} returned an error status"))?;

  response
    .text()
    .with_context(|| format!("failed to read response body from {url}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recognizes_remote_references() {
    assert!(is_remote_reference("https://example.com/app.js"));
    assert!(is_remote_reference("HTTP://example.com/app.js"));
  }

  #[test]
  fn keeps_local_paths_and_other_schemes_local() {
    assert!(!is_remote_reference("styles/app.css"));
    assert!(!is_remote_reference("ftp://example.com/app.css"));
  }

  #[test]
  fn derives_filters_from_file_extension() {
    assert_eq!(AssetReference::file("a.scss").filters(), &[TransformFilter::Scss]);
    assert_eq!(
      AssetReference::file("scripts/app.coffee").filters(),
      &[TransformFilter::CoffeeScript]
    );
    assert!(AssetReference::file("a.css").filters().is_empty());
    assert!(AssetReference::file("noextension").filters().is_empty());
  }

  #[test]
  fn derives_filters_from_url_path_ignoring_query() {
    let asset = AssetReference::remote("https://cdn.example.com/lib/app.coffee?v=2#frag").unwrap();
    assert_eq!(asset.filters(), &[TransformFilter::CoffeeScript]);

    let AssetSource::Remote(url) = asset.source() else {
      panic!("expected a remote source");
    };
    assert_eq!(url.path(), "/lib/app.coffee");
  }

  #[test]
  fn rejects_non_http_remote_references() {
    let err = AssetReference::remote("ftp://example.com/a.css").unwrap_err();
    assert!(matches!(err, BundleError::AssetResolution { .. }));

    let err = AssetReference::remote("styles/a.css").unwrap_err();
    assert!(matches!(err, BundleError::AssetResolution { .. }));
  }

  #[test]
  fn resolving_a_missing_file_fails() {
    let err = AssetReference::file("/nonexistent/missing.css")
      .resolve()
      .unwrap_err();
    assert!(matches!(err, BundleError::AssetResolution { .. }));
  }

  #[test]
  fn resolving_an_error_status_fails() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = std::thread::spawn(move || {
      let request = server.recv().unwrap();
      let response = tiny_http::Response::from_string("gone").with_status_code(404);
      request.respond(response).unwrap();
    });

    let asset = AssetReference::remote(&format!("http://{addr}/missing.css")).unwrap();
    let err = asset.resolve().unwrap_err();
    handle.join().unwrap();

    assert!(matches!(err, BundleError::AssetResolution { .. }));
  }
}
