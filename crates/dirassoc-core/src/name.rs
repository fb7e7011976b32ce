//! Name validation and normalization for directory and file segments.
//!
//! The reserved characters follow the host platform: Windows forbids a set of
//! punctuation and all ASCII control characters, while Unix only forbids NUL
//! and `/` inside a file name.

use crate::error::TreeError;

/// Characters never allowed in a directory name.
#[cfg(windows)]
pub const INVALID_PATH_CHARS: &[char] = &['"', '<', '>', '|'];

/// Characters never allowed in a directory name.
#[cfg(not(windows))]
pub const INVALID_PATH_CHARS: &[char] = &[];

/// Characters never allowed in a file name, in addition to [`INVALID_PATH_CHARS`].
#[cfg(windows)]
pub const INVALID_FILE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?'];

/// Characters never allowed in a file name, in addition to [`INVALID_PATH_CHARS`].
#[cfg(not(windows))]
pub const INVALID_FILE_NAME_CHARS: &[char] = &['/'];

#[cfg(windows)]
fn is_reserved_control(c: char) -> bool {
    (c as u32) < 0x20
}

#[cfg(not(windows))]
fn is_reserved_control(c: char) -> bool {
    c == '\0'
}

fn is_invalid_path_char(c: char) -> bool {
    is_reserved_control(c) || INVALID_PATH_CHARS.contains(&c)
}

/// Lowercase a name the way every key in the tree is stored.
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
}

/// Check that `name` can be stored as a single directory segment.
///
/// An empty name is accepted here; only the root may carry one, and callers
/// descending into children reject empty segments themselves.
pub fn validate_directory_name(name: &str, separator: char) -> Result<(), TreeError> {
    let invalid = name
        .chars()
        .any(|c| c == separator || is_invalid_path_char(c));
    if invalid {
        return Err(TreeError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Check that `name` is a non-empty file name without any directory component.
pub fn validate_file_name(name: &str) -> Result<(), TreeError> {
    if name.is_empty() {
        return Err(TreeError::EmptyPath);
    }
    let invalid = name
        .chars()
        .any(|c| is_invalid_path_char(c) || INVALID_FILE_NAME_CHARS.contains(&c));
    if invalid {
        return Err(TreeError::InvalidFileName {
            name: name.to_string(),
        });
    }
    Ok(())
}
