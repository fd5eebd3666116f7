//! Issue paths for locating values in nested structures.
//!
//! An [`IssuePath`] starts empty at the shape that raised an issue. Each
//! composite parent prepends its own key on the way up, so by the time an
//! issue reaches the caller its path runs from the root value.

use std::collections::VecDeque;
use std::fmt::{self, Display};

use crate::value::Value;

/// A segment of an issue path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// A sequence position (e.g., `[0]`, `[42]`)
    Index(usize),
    /// A property of a plain object (e.g., `user`, `email`)
    Field(String),
    /// An opaque key of a map entry
    Key(Value),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// Creates a new map key segment.
    pub fn key(key: impl Into<Value>) -> Self {
        PathSegment::Key(key.into())
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

/// The location of an issue relative to the value handed to the top-level call.
///
/// # Example
///
/// ```rust
/// use verdict::IssuePath;
///
/// let path = IssuePath::root()
///     .push_field("users")
///     .push_index(0)
///     .push_field("email");
///
/// assert_eq!(path.to_string(), "users[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssuePath {
    segments: VecDeque<PathSegment>,
}

impl IssuePath {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Field(name.into()))
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    /// Returns a new path with a map key segment appended.
    pub fn push_key(&self, key: impl Into<Value>) -> Self {
        self.push(PathSegment::Key(key.into()))
    }

    fn push(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push_back(segment);
        Self { segments }
    }

    /// Inserts a segment in front of the path.
    ///
    /// This is the one in-place change an issue path ever sees: a composite
    /// shape relocating a child's issue under its own key.
    pub fn prepend(&mut self, segment: PathSegment) {
        self.segments.push_front(segment);
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the parent path (all segments except the last), or None if this is root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            let mut segments = self.segments.clone();
            segments.pop_back();
            Some(Self { segments })
        }
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.front()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.back()
    }
}

impl Display for IssuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
                PathSegment::Key(key) => write!(f, "[{}]", key)?,
            }
        }
        Ok(())
    }
}
