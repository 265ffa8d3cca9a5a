//! Dotted-integer version ordering
//!
//! Versions are dot-separated non-negative integers (`1.2.10`). Missing trailing
//! components count as zero, so `1.2` and `1.2.0` are the same version.
//! Components have no size limit; they are kept as digit strings and compared
//! by magnitude.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::version::error::VersionError;

/// A parsed version identifier
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<String>,
}

impl Version {
    /// Creates a version from its numeric components
    pub fn new(components: impl IntoIterator<Item = u64>) -> Self {
        Self {
            components: components.into_iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Components as written, including leading and trailing zeros
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Components without leading zeros, trailing zero components removed;
    /// equal versions share this form. Zero becomes the empty string.
    fn significant(&self) -> Vec<&str> {
        let mut digits: Vec<&str> = self
            .components
            .iter()
            .map(|c| c.trim_start_matches('0'))
            .collect();
        while digits.last().is_some_and(|d| d.is_empty()) {
            digits.pop();
        }
        digits
    }
}

/// Numeric order of two digit strings without leading zeros
fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let components = s
            .split('.')
            .map(|component| {
                if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::InvalidComponent {
                        version: s.to_string(),
                        component: component.to_string(),
                    });
                }
                Ok(component.to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ours, theirs) = (self.significant(), other.significant());
        for (a, b) in ours.iter().zip(&theirs) {
            match cmp_digits(a, b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        // Once trailing zeros are gone, a shorter prefix is the smaller version
        ours.len().cmp(&theirs.len())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components = self.components.iter();
        if let Some(first) = components.next() {
            write!(f, "{first}")?;
        }
        for component in components {
            write!(f, ".{component}")?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Compare two version strings
///
/// Returns how `a` orders relative to `b`, or the error for whichever side
/// fails to parse first.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a: Version = a.parse()?;
    let b: Version = b.parse()?;
    Ok(a.cmp(&b))
}
