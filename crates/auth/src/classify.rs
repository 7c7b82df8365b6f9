//! Static route classification.
//!
//! An ordered list of path patterns, each mapped to an access class. Lookup
//! is first-match-wins; a path no rule matches is protected and open to any
//! authenticated role.

use thiserror::Error;

use crate::Role;

/// What a protected route demands of the caller's credential.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Requirement {
    Role(Role),
    AnyAuthenticated,
}

impl Requirement {
    pub fn admits(&self, role: Role) -> bool {
        match self {
            Requirement::Role(required) => *required == role,
            Requirement::AnyAuthenticated => true,
        }
    }
}

impl core::fmt::Display for Requirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Requirement::Role(role) => core::fmt::Display::fmt(role, f),
            Requirement::AnyAuthenticated => f.write_str("any authenticated"),
        }
    }
}

/// Access class of a path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RouteClass {
    Public,
    Protected(Requirement),
}

impl RouteClass {
    /// Fail-closed class for paths no rule claims.
    pub const DEFAULT: RouteClass = RouteClass::Protected(Requirement::AnyAuthenticated);

    pub fn is_public(&self) -> bool {
        matches!(self, RouteClass::Public)
    }
}

/// Path pattern.
///
/// - `"/admin/*"` matches `/admin` and anything below `/admin/`.
/// - `"/user/signin*"` matches any path beginning with `/user/signin`.
/// - anything else matches that exact path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
    Subtree(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        if let Some(base) = pattern.strip_suffix("/*") {
            PathPattern::Subtree(base.to_string())
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            PathPattern::Prefix(prefix.to_string())
        } else {
            PathPattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathPattern::Subtree(base) => under_subtree(base, path),
        }
    }

    /// True if every path `other` matches is also matched by `self`.
    pub fn covers(&self, other: &PathPattern) -> bool {
        match (self, other) {
            (_, PathPattern::Exact(path)) => self.matches(path),
            (PathPattern::Exact(_), _) => false,
            (PathPattern::Prefix(a), PathPattern::Prefix(b) | PathPattern::Subtree(b)) => {
                b.starts_with(a.as_str())
            }
            (PathPattern::Subtree(a), PathPattern::Subtree(b)) => under_subtree(a, b),
            // A raw prefix also matches siblings like `/admins`, so only a
            // prefix strictly inside the subtree is covered.
            (PathPattern::Subtree(a), PathPattern::Prefix(b)) => b.starts_with(&format!("{a}/")),
        }
    }
}

fn under_subtree(base: &str, path: &str) -> bool {
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl core::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathPattern::Exact(p) => f.write_str(p),
            PathPattern::Prefix(p) => write!(f, "{p}*"),
            PathPattern::Subtree(p) => write!(f, "{p}/*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub class: RouteClass,
}

impl RouteRule {
    pub fn new(pattern: &str, class: RouteClass) -> Self {
        Self {
            pattern: PathPattern::parse(pattern),
            class,
        }
    }

    pub fn public(pattern: &str) -> Self {
        Self::new(pattern, RouteClass::Public)
    }

    pub fn role(pattern: &str, role: Role) -> Self {
        Self::new(pattern, RouteClass::Protected(Requirement::Role(role)))
    }

    pub fn authenticated(pattern: &str) -> Self {
        Self::new(pattern, RouteClass::Protected(Requirement::AnyAuthenticated))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    /// A rule can never match because an earlier rule claims all its paths.
    #[error("ambiguous route table: rule '{shadowed}' is unreachable behind '{by}'")]
    Ambiguous { shadowed: String, by: String },
}

/// Ordered, immutable route classification table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Build a table, rejecting rules shadowed by an earlier rule.
    pub fn new(rules: Vec<RouteRule>) -> Result<Self, RouteTableError> {
        for (i, later) in rules.iter().enumerate() {
            if let Some(earlier) = rules[..i].iter().find(|r| r.pattern.covers(&later.pattern)) {
                return Err(RouteTableError::Ambiguous {
                    shadowed: later.pattern.to_string(),
                    by: earlier.pattern.to_string(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// The application's route table.
    pub fn standard() -> Result<Self, RouteTableError> {
        Self::new(vec![
            RouteRule::public("/user/signin*"),
            RouteRule::public("/public/*"),
            RouteRule::role("/admin/*", Role::Admin),
            RouteRule::role("/student/*", Role::Student),
            RouteRule::authenticated("/users/*"),
        ])
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Classify a request path.
    ///
    /// Paths with `.` or `..` segments skip the table entirely and get the
    /// fail-closed default, so `/public/../admin` is never public.
    pub fn classify(&self, path: &str) -> RouteClass {
        if has_dot_segment(path) {
            tracing::debug!(path, "dot segment in path; failing closed");
            return RouteClass::DEFAULT;
        }

        match self.rules.iter().find(|r| r.pattern.matches(path)) {
            Some(rule) => rule.class,
            None => {
                tracing::debug!(path, "no route rule matched; failing closed");
                RouteClass::DEFAULT
            }
        }
    }
}

fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|seg| seg == "." || seg == "..")
}
