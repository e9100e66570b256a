//! JSON Pointer paths used to address validation errors
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A JSON Pointer (RFC 6901) into the document being validated
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    path: String,
}

impl Pointer {
    /// The whole document
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a child pointer for an object member
    pub fn child<S: AsRef<str>>(&self, member: S) -> Self {
        let segment = member.as_ref().replace('~', "~0").replace('/', "~1");
        Self {
            path: format!("{}/{}", self.path, segment),
        }
    }

    /// Create a child pointer for an array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}/{}", self.path, index),
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The pointer as it appears in error output; the root renders as `/`
    pub fn as_str(&self) -> &str {
        if self.is_root() {
            "/"
        } else {
            &self.path
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Pointer> for String {
    fn from(pointer: &Pointer) -> Self {
        pointer.as_str().to_string()
    }
}
