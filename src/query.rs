//! Query parameter parsing for `GET /`
//!
//! Turns the raw query string into a `ReadRequest`: applies defaults,
//! validates `readFrom` and `limit`, and resolves `alias` before the reader is
//! ever involved.

use crate::alias::AliasResolver;
use crate::error::{Result, VisionError};
use crate::models::{ReadDirection, ReadRequest};
use std::path::PathBuf;
use tracing::debug;

/// Number of lines returned when `limit` is not given
pub const DEFAULT_LIMIT: i64 = 10;

/// Raw parameters of a view request
///
/// Values are percent-decoded. When a parameter is repeated the first
/// occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub path: Option<String>,
    pub alias: Option<String>,
    pub read_from: Option<String>,
    pub limit: Option<String>,
    pub filter_by: Option<String>,
    pub ignore: Option<String>,
}

impl ViewQuery {
    /// Parse a URI query string (without the leading `?`)
    pub fn parse(query: Option<&str>) -> Self {
        let mut parsed = ViewQuery::default();
        let Some(query) = query else {
            return parsed;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "path" => &mut parsed.path,
                "alias" => &mut parsed.alias,
                "readFrom" => &mut parsed.read_from,
                "limit" => &mut parsed.limit,
                "filterBy" => &mut parsed.filter_by,
                "ignore" => &mut parsed.ignore,
                other => {
                    debug!("Ignoring unknown query parameter '{}'", other);
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        parsed
    }

    /// `readFrom`, defaulting to tail
    pub fn direction(&self) -> Result<ReadDirection> {
        match self.read_from.as_deref() {
            None => Ok(ReadDirection::Tail),
            Some(value) => value.parse(),
        }
    }

    /// `limit`, defaulting to `DEFAULT_LIMIT`
    ///
    /// # Errors
    /// `InvalidLimit` when the value is not an integer, is negative, or
    /// exceeds `max_limit`.
    pub fn limit(&self, max_limit: Option<u64>) -> Result<i64> {
        let limit = match self.limit.as_deref() {
            None => DEFAULT_LIMIT,
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
                VisionError::InvalidLimit(format!("'{}' is not an integer: {}", raw, e))
            })?,
        };

        if limit < 0 {
            return Err(VisionError::InvalidLimit(format!(
                "limit must be a non-negative integer, got {}",
                limit
            )));
        }

        if let Some(max) = max_limit {
            if (limit as u64) > max {
                return Err(VisionError::InvalidLimit(format!(
                    "limit {} exceeds the maximum of {}",
                    limit, max
                )));
            }
        }

        Ok(limit)
    }

    /// The file to read
    ///
    /// `alias` takes precedence over `path` when both are given. Empty values
    /// count as absent.
    pub fn resolve_path(&self, aliases: &AliasResolver) -> Result<PathBuf> {
        if let Some(alias) = non_empty(&self.alias) {
            if non_empty(&self.path).is_some() {
                debug!("Both alias and path supplied, using alias '{}'", alias);
            }
            return aliases
                .resolve(alias)
                .map(|p| p.to_path_buf())
                .ok_or_else(|| VisionError::AliasNotFound(alias.to_string()));
        }

        match non_empty(&self.path) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Err(VisionError::MissingResource),
        }
    }

    /// Build the reader request
    ///
    /// Filters are passed through uncompiled; the reader reports bad
    /// patterns as `InvalidFilter`.
    pub fn to_read_request(
        &self,
        aliases: &AliasResolver,
        max_limit: Option<u64>,
    ) -> Result<ReadRequest> {
        let direction = self.direction()?;
        let limit = self.limit(max_limit)?;
        let path = self.resolve_path(aliases)?;

        Ok(ReadRequest {
            path,
            direction,
            limit,
            include: self.filter_by.clone(),
            exclude: self.ignore.clone(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
