//! Go release numbers.
//!
//! Go releases are dotted numbers (`1.22.3`, historically `1.20` for the
//! first release of a line) optionally ending in a pre-release tag glued to
//! the last component (`1.22rc1`, `1.21beta2`).

use crate::error::{Error, Result};
use crate::token::strip_go_prefix;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

static GO_VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<nums>[0-9]+(?:\.[0-9]+)*)(?:(?<kind>alpha|beta|rc)(?<n>[0-9]+)?)?$")
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// Pre-release tag. Declaration order is precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreRelease {
    Alpha(u64),
    Beta(u64),
    Rc(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GoVersion {
    raw:        String,
    components: Vec<u64>,
    pre:        Option<PreRelease>,
}

impl GoVersion {
    /// Parses a Go version, accepting an optional `go` prefix.
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        let caps = GO_VERSION_REGEX
            .captures(strip_go_prefix(raw))
            .ok_or_else(|| Error::InvalidVersion(s.to_string()))?;

        let components = caps["nums"]
            .split('.')
            .map(|c| c.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidVersion(s.to_string()))?;

        let pre = match caps.name("kind") {
            None => None,
            Some(kind) => {
                let n = caps
                    .name("n")
                    .map(|n| n.as_str().parse::<u64>())
                    .transpose()
                    .map_err(|_| Error::InvalidVersion(s.to_string()))?
                    .unwrap_or(0);
                Some(match kind.as_str() {
                    "alpha" => PreRelease::Alpha(n),
                    "beta" => PreRelease::Beta(n),
                    _ => PreRelease::Rc(n),
                })
            }
        };

        Ok(Self {
            raw: raw.to_string(),
            components,
            pre,
        })
    }

    pub fn as_str(&self) -> &str { &self.raw }

    pub fn major(&self) -> u64 { self.components[0] }

    pub fn minor(&self) -> Option<u64> { self.components.get(1).copied() }

    pub fn patch(&self) -> Option<u64> { self.components.get(2).copied() }

    pub fn components(&self) -> &[u64] { &self.components }

    pub fn pre_release(&self) -> Option<PreRelease> { self.pre }

    pub fn is_stable(&self) -> bool { self.pre.is_none() }

    fn cmp_numeric(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        // A stable release outranks any pre-release of the same numbers.
        match (self.pre, other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // "1.20" and "1.20.0" are numerically equal; the raw text keeps the
        // order total.
        self.cmp_numeric(other)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for GoVersion {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for GoVersion {}

impl std::hash::Hash for GoVersion {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) { self.raw.hash(state) }
}

impl std::str::FromStr for GoVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> { GoVersion::parse(s) }
}

impl TryFrom<String> for GoVersion {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> { GoVersion::parse(&s) }
}

impl From<GoVersion> for String {
    fn from(v: GoVersion) -> Self { v.raw }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.raw) }
}

/// Total order over installed directory names. Names that are not Go
/// versions (`tip`, `1.22-custom`) sort below every real version and among
/// themselves by text.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (GoVersion::parse(a), GoVersion::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> GoVersion { GoVersion::parse(s).unwrap() }

    #[test]
    fn test_parse_components() {
        let ver = v("1.22.3");
        assert_eq!(ver.components(), &[1, 22, 3]);
        assert_eq!(ver.major(), 1);
        assert_eq!(ver.minor(), Some(22));
        assert_eq!(ver.patch(), Some(3));
        assert!(ver.is_stable());
    }

    #[test]
    fn test_parse_go_prefix_and_pre_release() {
        let ver = v("go1.22rc1");
        assert_eq!(ver.components(), &[1, 22]);
        assert_eq!(ver.pre_release(), Some(PreRelease::Rc(1)));
        assert_eq!(ver.as_str(), "go1.22rc1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for s in ["", "tip", "1..2", "1.2-custom", "v1.2", "1.2.x", "latest"] {
            assert!(GoVersion::parse(s).is_err(), "{s}");
        }
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(v("1.10.10") > v("1.9.10"));
        assert!(v("1.10.10") > v("1.2.3"));
        assert!(v("1.9.10") > v("1.9.9"));
    }

    #[test]
    fn test_padding() {
        assert_eq!(v("1.20").cmp_numeric(&v("1.20.0")), Ordering::Equal);
        assert!(v("1.20.1") > v("1.20"));
        assert_ne!(v("1.20"), v("1.20.0"));
    }

    #[test]
    fn test_pre_release_ordering() {
        assert!(v("1.22.0") > v("1.22rc2"));
        assert!(v("1.22rc2") > v("1.22rc1"));
        assert!(v("1.22rc1") > v("1.22beta1"));
        assert!(v("1.22beta1") > v("1.22alpha3"));
        assert!(v("1.22rc1") > v("1.21.9"));
    }

    #[test]
    fn test_compare_versions_unparseable_lowest() {
        assert_eq!(compare_versions("1.0", "tip"), Ordering::Greater);
        assert_eq!(compare_versions("tip", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("a", "b"), Ordering::Less);
    }

    #[test]
    fn test_serde_as_string() {
        let ver: GoVersion = String::from("1.21.4").try_into().unwrap();
        let back: String = ver.into();
        assert_eq!(back, "1.21.4");
    }

    fn version_strategy() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(0u64..30, 1..4),
            prop::option::of((0usize..3, 0u64..4)),
        )
            .prop_map(|(nums, pre)| {
                let mut s = nums
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(".");
                if let Some((kind, n)) = pre {
                    s.push_str(["alpha", "beta", "rc"][kind]);
                    s.push_str(&n.to_string());
                }
                s
            })
    }

    proptest! {
        #[test]
        fn prop_generated_versions_parse(s in version_strategy()) {
            prop_assert!(GoVersion::parse(&s).is_ok());
        }

        #[test]
        fn prop_order_antisymmetric(a in version_strategy(), b in version_strategy()) {
            let (va, vb) = (v(&a), v(&b));
            prop_assert_eq!(va.cmp(&vb), vb.cmp(&va).reverse());
        }

        #[test]
        fn prop_order_transitive(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            let mut sorted = vec![v(&a), v(&b), v(&c)];
            sorted.sort();
            prop_assert!(sorted[0] <= sorted[1] && sorted[1] <= sorted[2]);
            prop_assert!(sorted[0] <= sorted[2]);
        }

        #[test]
        fn prop_bumping_a_component_increases(
            nums in prop::collection::vec(0u64..30, 1..4),
            idx in 0usize..3,
        ) {
            let idx = idx % nums.len();
            let mut bumped = nums.clone();
            bumped[idx] += 1;
            let join = |n: &[u64]| n.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
            prop_assert!(v(&join(&bumped)) > v(&join(&nums)));
        }
    }
}
