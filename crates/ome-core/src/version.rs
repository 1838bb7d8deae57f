//! Model and framework version comparison.
//!
//! A version is one or more dot-separated numeric components, optionally
//! preceded by a textual major prefix (`v1.2`) and optionally followed by a
//! pre-release suffix (`-dev`, `-alpha.1`) and/or build metadata (`+cu121`).
//! Versions carrying either suffix are *unofficial*: they never take part in
//! ordering, only in strict equality.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::BuildMetadata;
use thiserror::Error;

use crate::types::RuntimeSelectorOperator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,
    #[error("invalid numeric component '{component}' in version '{version}'")]
    InvalidComponent { version: String, component: String },
    #[error("invalid pre-release suffix in version '{0}'")]
    InvalidPrerelease(String),
    #[error("invalid build metadata in version '{0}'")]
    InvalidBuild(String),
}

/// A parsed model/framework version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelVersion {
    raw: String,
    major_prefix: String,
    components: Vec<u64>,
    pre: String,
    build: BuildMetadata,
}

impl ModelVersion {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(VersionError::Empty);
        }

        let (rest, build) = match raw.split_once('+') {
            Some((rest, build)) => (
                rest,
                BuildMetadata::new(build)
                    .map_err(|_| VersionError::InvalidBuild(raw.to_string()))?,
            ),
            None => (raw, BuildMetadata::EMPTY),
        };

        let (rest, pre) = match rest.split_once('-') {
            Some((rest, pre)) if is_valid_suffix(pre) => (rest, pre.to_string()),
            Some(_) => return Err(VersionError::InvalidPrerelease(raw.to_string())),
            None => (rest, String::new()),
        };

        let numeric_start = rest
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| VersionError::InvalidComponent {
                version: raw.to_string(),
                component: rest.to_string(),
            })?;
        let (prefix, numeric) = rest.split_at(numeric_start);
        if !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(VersionError::InvalidComponent {
                version: raw.to_string(),
                component: prefix.to_string(),
            });
        }

        let components = numeric
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| VersionError::InvalidComponent {
                    version: raw.to_string(),
                    component: part.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            major_prefix: prefix.to_string(),
            components,
            pre,
            build,
        })
    }

    /// Number of numeric segments (`"1.8"` → 2, `"1.8.0"` → 3).
    pub fn precision(&self) -> usize {
        self.components.len()
    }

    pub fn major_prefix(&self) -> &str {
        &self.major_prefix
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// True when the version carries a pre-release or build-metadata suffix.
    pub fn is_unofficial(&self) -> bool {
        !self.pre.is_empty() || !self.build.is_empty()
    }

    fn cmp_components(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Dot-separated, non-empty identifiers of ASCII alphanumerics and hyphens.
/// Numeric identifiers may carry leading zeros (`rc.01`).
fn is_valid_suffix(suffix: &str) -> bool {
    suffix.split('.').all(|ident| {
        !ident.is_empty() && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

impl FromStr for ModelVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strict equality: same prefix, same components, same suffixes.
pub fn equal(a: &ModelVersion, b: &ModelVersion) -> bool {
    a.major_prefix == b.major_prefix
        && a.components == b.components
        && a.pre == b.pre
        && a.build == b.build
}

/// Numeric ordering of the components of `a` over `b`.
pub fn greater_than(a: &ModelVersion, b: &ModelVersion) -> bool {
    a.cmp_components(b) == Ordering::Greater
}

pub fn greater_than_or_equal(a: &ModelVersion, b: &ModelVersion) -> bool {
    a.cmp_components(b) != Ordering::Less
}

/// Decide whether the version a runtime supports satisfies the version a
/// model declares, under `operator`.
///
/// Unofficial versions and the `Equal` operator force strict equality.
/// Otherwise both sides must share precision and major prefix before any
/// ordering is attempted. Unparseable versions never match.
pub fn satisfies(supported: &str, model: &str, operator: RuntimeSelectorOperator) -> bool {
    let (Ok(supported), Ok(model)) = (ModelVersion::parse(supported), ModelVersion::parse(model))
    else {
        return false;
    };

    if supported.is_unofficial() || model.is_unofficial() || operator == RuntimeSelectorOperator::Equal
    {
        return equal(&supported, &model);
    }

    if supported.precision() != model.precision() || supported.major_prefix != model.major_prefix {
        return false;
    }

    match operator {
        RuntimeSelectorOperator::GreaterThan => greater_than(&supported, &model),
        RuntimeSelectorOperator::GreaterThanOrEqual => greater_than_or_equal(&supported, &model),
        RuntimeSelectorOperator::Equal => equal(&supported, &model),
    }
}
