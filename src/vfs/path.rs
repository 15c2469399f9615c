use serde::Serialize;
use std::fmt;

use crate::errors::{DeskError, DeskErrorType, Result};

/// A location in the tree as a list of segments below the root.
/// The root itself is the empty list and renders as `/`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VfsPath {
    segments: Vec<String>,
}

impl VfsPath {
    pub fn root() -> VfsPath {
        VfsPath::default()
    }

    pub fn from_segments<I, S>(segments: I) -> VfsPath
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VfsPath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Drops the last segment. Returns false when already at the root.
    pub fn pop(&mut self) -> bool {
        self.segments.pop().is_some()
    }

    /// Parses user input against this path. A leading `/` starts from the
    /// root, anything else is relative. Empty and `.` segments are skipped and
    /// `..` climbs one level, stopping at the root. Never fails: a segment
    /// that does not exist is kept and rejected later by resolution.
    pub fn resolve(&self, text: &str) -> VfsPath {
        let mut resolved = if text.starts_with('/') {
            VfsPath::root()
        } else {
            self.clone()
        };
        for part in text.split('/') {
            match part {
                "" | "." => (),
                ".." => {
                    resolved.pop();
                }
                name => resolved.segments.push(name.to_string()),
            }
        }
        resolved
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Entry names are single path segments.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(DeskError::new(
            DeskErrorType::InvalidPath,
            format!("Invalid name: '{}'", name),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_hides_root() {
        assert_eq!(VfsPath::root().to_string(), "/");
        assert_eq!(VfsPath::from_segments(["home", "user"]).to_string(), "/home/user");
    }

    #[test]
    fn absolute_ignores_current() {
        let current = VfsPath::from_segments(["home", "user"]);
        assert_eq!(current.resolve("/bin"), VfsPath::from_segments(["bin"]));
        assert_eq!(current.resolve("/"), VfsPath::root());
        assert_eq!(current.resolve("//bin//"), VfsPath::from_segments(["bin"]));
    }

    #[test]
    fn relative_appends_to_current() {
        let current = VfsPath::from_segments(["home"]);
        assert_eq!(
            current.resolve("user/documents"),
            VfsPath::from_segments(["home", "user", "documents"])
        );
        assert_eq!(current.resolve("./user"), VfsPath::from_segments(["home", "user"]));
    }

    #[test]
    fn dot_dot_stops_at_root() {
        let current = VfsPath::from_segments(["home"]);
        assert_eq!(current.resolve("../../.."), VfsPath::root());
        assert_eq!(current.resolve("../bin"), VfsPath::from_segments(["bin"]));
    }

    #[test]
    fn names_are_single_segments() {
        assert!(validate_name("notes.txt").is_ok());
        for bad in ["", ".", "..", "a/b"] {
            let err = validate_name(bad).unwrap_err();
            assert_eq!(err.error_type, DeskErrorType::InvalidPath);
        }
    }
}
