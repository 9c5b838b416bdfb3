//! Structural resource naming
//!
//! Every resource the composer creates is named deterministically from a
//! single scope path, so collaborating stacks never rely on manual string
//! concatenation to keep names unique. A scope is an ordered path of
//! validated segments (`prod` → `prod/edge`), and qualified names flatten
//! the path with a resource-kind infix: `prod-edge-tg-frontend`.

use crate::errors::ConfigurationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]{0,30}[a-z0-9])?$").expect("static regex"));

/// A path of naming segments owned by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope {
    segments: Vec<String>,
}

impl Scope {
    /// Create a root scope from a single segment
    pub fn root(segment: impl Into<String>) -> Result<Self, ConfigurationError> {
        let segment = segment.into();
        Self::check_segment(&segment)?;
        Ok(Self { segments: vec![segment] })
    }

    /// Derive a child scope by appending a segment
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, ConfigurationError> {
        let segment = segment.into();
        Self::check_segment(&segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// Qualified resource name: scope path, resource kind, leaf name.
    ///
    /// `Scope("prod/edge").qualify("tg", "frontend")` yields
    /// `prod-edge-tg-frontend`.
    pub fn qualify(&self, kind: &str, leaf: &str) -> String {
        let mut parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        parts.push(kind);
        if !leaf.is_empty() {
            parts.push(leaf);
        }
        parts.join("-")
    }

    /// The flattened scope path itself (`prod-edge`)
    pub fn flatten(&self) -> String {
        self.segments.join("-")
    }

    /// The scope path with `/` separators (`prod/edge`)
    pub fn as_path(&self) -> String {
        self.segments.join("/")
    }

    /// Path segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn check_segment(segment: &str) -> Result<(), ConfigurationError> {
        if SEGMENT_RE.is_match(segment) {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidScopeSegment { segment: segment.to_string() })
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path())
    }
}
