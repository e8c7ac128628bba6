//! Path normalization
//!
//! Remote paths are UNIX-style, slash-separated names walked down from the
//! drive root. User input may be relative to the working directory and may
//! contain `.` and `..`; [`normalize`] turns it into a [`CanonicalPath`].
//! Nothing here talks to the drive: existence is checked by the resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An absolute path with no `.`/`..` segments, no repeated slashes and no
/// trailing slash (except the root `/` itself)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// The drive root, `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Accept a string only if it is already canonical
    pub fn parse(path: &str) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(format!("'{path}' is not absolute")));
        }
        let normalized = normalize(&Self::root(), path);
        if normalized.0 != path {
            return Err(Error::InvalidPath(format!(
                "'{path}' is not canonical (expected '{normalized}')"
            )));
        }
        Ok(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments from the root down, empty for the root
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The containing folder, `None` for the root
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(pos) => Some(Self(self.0[..pos].to_string())),
            None => None,
        }
    }

    /// The final segment, `None` for the root
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Append a single child name
    pub fn join(&self, name: &str) -> Self {
        normalize(self, name)
    }

    /// Component-wise prefix test: `/a` contains `/a/b` but not `/ab`
    pub fn is_ancestor_of(&self, other: &CanonicalPath) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other
            .0
            .strip_prefix(&self.0)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Default for CanonicalPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CanonicalPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CanonicalPath> for String {
    fn from(path: CanonicalPath) -> Self {
        path.0
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve `input` against `cwd` into a canonical absolute path.
///
/// - empty input and `.` return `cwd`
/// - input starting with `/` ignores `cwd`
/// - `..` drops the previous segment and is a no-op at the root
/// - repeated and trailing slashes are collapsed
pub fn normalize(cwd: &CanonicalPath, input: &str) -> CanonicalPath {
    if input.is_empty() || input == "." {
        return cwd.clone();
    }

    let mut stack: Vec<&str> = if input.starts_with('/') {
        Vec::new()
    } else {
        cwd.segments().collect()
    };

    for segment in input.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            name => stack.push(name),
        }
    }

    if stack.is_empty() {
        CanonicalPath::root()
    } else {
        CanonicalPath(format!("/{}", stack.join("/")))
    }
}
