//! Include/exclude line filtering

use crate::error::{FilterKind, Result, VisionError};
use regex::Regex;

/// Compiled `filterBy` / `ignore` pair
///
/// A line passes when it matches the include pattern (if any) and does not
/// match the exclude pattern (if any). Empty pattern strings are treated as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl LineFilter {
    /// Compile both patterns
    ///
    /// # Returns
    /// * `Err(VisionError::InvalidFilter)` naming the first pattern that fails
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(LineFilter {
            include: compile(FilterKind::Include, include)?,
            exclude: compile(FilterKind::Exclude, exclude)?,
        })
    }

    /// Whether neither pattern is set
    pub fn is_pass_all(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    /// Check a single, terminator-stripped line
    pub fn matches(&self, line: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(line) {
                return false;
            }
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(line),
            None => true,
        }
    }
}

fn compile(kind: FilterKind, pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        None | Some("") => Ok(None),
        Some(pattern) => Regex::new(pattern)
            .map(Some)
            .map_err(|e| VisionError::invalid_filter(kind, pattern, &e)),
    }
}
