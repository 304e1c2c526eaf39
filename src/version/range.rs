//! npm-style range expressions
//!
//! Supports the range forms found in `package.json` dependency entries:
//! - `1.2.3` - exact match
//! - `^1.2.3`, `~1.2.3` - caret and tilde ranges
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `*` - wildcards
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=1.0.0 <2.0.0` (AND) and `^1.0.0 || ^2.0.0` (OR)

use semver::Version;

use crate::version::semver::parse_version;

/// A parsed range expression
#[derive(Debug)]
pub enum VersionSpec {
    Single(Comparator),
    /// Space-separated comparators, all must hold
    All(Vec<Comparator>),
    /// `||`-separated alternatives, any may hold
    Any(Vec<VersionSpec>),
}

impl VersionSpec {
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }

        if spec.contains("||") {
            let alternatives = spec
                .split("||")
                .map(Self::parse_conjunction)
                .collect::<Option<Vec<_>>>()?;
            return Some(VersionSpec::Any(alternatives));
        }

        Self::parse_conjunction(spec)
    }

    fn parse_conjunction(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }

        if let Some(hyphen) = Comparator::parse_hyphen(spec) {
            return Some(VersionSpec::Single(hyphen));
        }

        let mut comparators = spec
            .split_whitespace()
            .map(Comparator::parse)
            .collect::<Option<Vec<_>>>()?;

        if comparators.len() == 1 {
            comparators.pop().map(VersionSpec::Single)
        } else {
            Some(VersionSpec::All(comparators))
        }
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Single(comparator) => comparator.satisfies(version),
            VersionSpec::All(comparators) => comparators.iter().all(|c| c.satisfies(version)),
            VersionSpec::Any(specs) => specs.iter().any(|s| s.satisfies(version)),
        }
    }

    /// Whether any comparator names a pre-release on the same `major.minor.patch`
    /// as `version`, which opts that tuple's pre-releases into matching.
    pub fn allows_pre_release_of(&self, version: &Version) -> bool {
        match self {
            VersionSpec::Single(comparator) => comparator.names_pre_release_of(version),
            VersionSpec::All(comparators) => {
                comparators.iter().any(|c| c.names_pre_release_of(version))
            }
            VersionSpec::Any(specs) => specs.iter().any(|s| s.allows_pre_release_of(version)),
        }
    }
}

/// A single range comparator
#[derive(Debug)]
pub enum Comparator {
    Exact(Version),
    /// `^1.2.3` means >=1.2.3 <2.0.0, narrowing for 0.x and 0.0.x
    Caret(Version),
    /// `~1.2.3` means >=1.2.3 <1.3.0
    Tilde(Version),
    Gte(Version),
    Gt(Version),
    Lte(Version),
    Lt(Version),
    Wildcard,
    WildcardMajor(u64),
    WildcardMinor(u64, u64),
    Hyphen { from: Version, to: Version },
}

impl Comparator {
    fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        // Longer operators first so ">=" is not read as ">"
        let operators: [(&str, fn(Version) -> Comparator); 6] = [
            (">=", Comparator::Gte),
            ("<=", Comparator::Lte),
            (">", Comparator::Gt),
            ("<", Comparator::Lt),
            ("^", Comparator::Caret),
            ("~", Comparator::Tilde),
        ];
        for (operator, build) in operators {
            if let Some(rest) = spec.strip_prefix(operator) {
                return parse_version(rest.trim()).map(build);
            }
        }

        if spec == "*" || spec.eq_ignore_ascii_case("x") {
            return Some(Comparator::Wildcard);
        }

        Self::parse_wildcard(spec).or_else(|| parse_version(spec).map(Comparator::Exact))
    }

    fn parse_hyphen(spec: &str) -> Option<Self> {
        let (from, to) = spec.split_once(" - ")?;
        Some(Comparator::Hyphen {
            from: parse_version(from.trim())?,
            to: parse_version(to.trim())?,
        })
    }

    fn parse_wildcard(spec: &str) -> Option<Self> {
        let parts: Vec<&str> = spec.split('.').collect();
        match parts.as_slice() {
            [major, x] if x.eq_ignore_ascii_case("x") => {
                major.parse().ok().map(Comparator::WildcardMajor)
            }
            [major, minor, x] if x.eq_ignore_ascii_case("x") => Some(Comparator::WildcardMinor(
                major.parse().ok()?,
                minor.parse().ok()?,
            )),
            _ => None,
        }
    }

    fn satisfies(&self, version: &Version) -> bool {
        match self {
            Comparator::Exact(v) => version == v,
            Comparator::Caret(v) => {
                if version < v {
                    return false;
                }
                match (v.major, v.minor) {
                    (0, 0) => version.major == 0 && version.minor == 0 && version.patch == v.patch,
                    (0, minor) => version.major == 0 && version.minor == minor,
                    (major, _) => version.major == major,
                }
            }
            Comparator::Tilde(v) => {
                version >= v && version.major == v.major && version.minor == v.minor
            }
            Comparator::Gte(v) => version >= v,
            Comparator::Gt(v) => version > v,
            Comparator::Lte(v) => version <= v,
            Comparator::Lt(v) => version < v,
            Comparator::Wildcard => true,
            Comparator::WildcardMajor(major) => version.major == *major,
            Comparator::WildcardMinor(major, minor) => {
                version.major == *major && version.minor == *minor
            }
            Comparator::Hyphen { from, to } => version >= from && version <= to,
        }
    }

    fn names_pre_release_of(&self, version: &Version) -> bool {
        let same_tuple = |v: &Version| {
            !v.pre.is_empty()
                && v.major == version.major
                && v.minor == version.minor
                && v.patch == version.patch
        };
        match self {
            Comparator::Exact(v)
            | Comparator::Caret(v)
            | Comparator::Tilde(v)
            | Comparator::Gte(v)
            | Comparator::Gt(v)
            | Comparator::Lte(v)
            | Comparator::Lt(v) => same_tuple(v),
            Comparator::Hyphen { from, to } => same_tuple(from) || same_tuple(to),
            Comparator::Wildcard | Comparator::WildcardMajor(_) | Comparator::WildcardMinor(..) => {
                false
            }
        }
    }
}
