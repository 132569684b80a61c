//! Filename sanitization.
//!
//! Every filename-bearing operation (upload, download, delete, info) passes
//! the untrusted name through [`sanitize_filename`] before it reaches the
//! metadata store or the filesystem. Stored names are always flat: path
//! components are stripped, never preserved.

/// Fallback name for uploads whose sanitized name comes out empty.
pub const DEFAULT_FILENAME: &str = "unnamed_file";

/// Characters neutralized to `_` in addition to ASCII control characters.
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', ';'];

/// Sanitize an untrusted filename.
///
/// Strips everything up to and including the last path separator, rejects
/// the literal parent-directory token, and replaces control and
/// shell-special characters with `_`. An empty or fully-neutralized result
/// falls back to [`DEFAULT_FILENAME`].
pub fn sanitize_filename(name: &str) -> crate::Result<String> {
    let base = match name.rfind(['/', '\\']) {
        Some(pos) => &name[pos + 1..],
        None => name,
    };

    if base == ".." {
        return Err(crate::Error::InvalidFilename(
            "parent directory token not allowed".to_string(),
        ));
    }

    let safe: String = base
        .chars()
        .map(|c| {
            if (c as u32) < 0x20 || UNSAFE_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    // "." would name the directory entry itself rather than a file.
    if safe.is_empty() || safe == "." {
        return Ok(DEFAULT_FILENAME.to_string());
    }

    Ok(safe)
}
