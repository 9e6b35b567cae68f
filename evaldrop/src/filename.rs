//! Filename rules for stored logs: the allowed extension, sanitation of client-supplied names,
//! and the disambiguated names used when a sanitized name is already taken.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// The only extension accepted for uploads, compared case-insensitively.
pub const ALLOWED_EXTENSION: &str = "eval";

/// Length of the random hex token prepended to a name on collision.
pub const COLLISION_TOKEN_LEN: usize = 8;

/// Longest sanitized name, leaving room for a `<token>-` prefix within a 255-byte file name.
pub const MAX_NAME_LEN: usize = 255 - COLLISION_TOKEN_LEN - 1;

/// Whether the text after the last `.` is the allowed extension.
pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(ALLOWED_EXTENSION))
}

/// Whether `name` is a usable stored name: a non-empty base followed by the allowed extension.
pub fn is_storable_name(name: &str) -> bool {
    let (base, ext) = split_extension(name);
    !base.is_empty() && ext.len() > 1 && has_allowed_extension(name)
}

/// Reduce a client-supplied filename to a filesystem-safe one.
///
/// Characters are NFKD-decomposed and anything still non-ASCII is dropped, directory
/// separators become word breaks, runs of whitespace are joined with `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed, and leading or trailing `.`/`_` are stripped. Names longer than
/// [`MAX_NAME_LEN`] lose the end of their base, keeping the extension. The result may be empty.
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let safe = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string();

    truncate_name(safe)
}

/// Cut an ASCII name down to [`MAX_NAME_LEN`], shortening the base before the extension
fn truncate_name(name: String) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let (base, ext) = split_extension(&name);
    if ext.len() >= MAX_NAME_LEN {
        return name[..MAX_NAME_LEN].to_string();
    }
    format!("{}{}", &base[..MAX_NAME_LEN - ext.len()], ext)
}

/// Split a name into base and extension, the extension keeping its leading dot.
///
/// Leading dots are part of the base, so `".eval"` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(idx) => name.split_at(stem_start + idx),
        None => (name, ""),
    }
}

/// Name to use when `name` already exists: `<token>-<base><ext>`.
pub fn collision_name(name: &str, token: &str) -> String {
    let (base, ext) = split_extension(name);
    format!("{token}-{base}{ext}")
}

/// A fresh random token of [`COLLISION_TOKEN_LEN`] lowercase hex characters.
pub fn random_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(COLLISION_TOKEN_LEN);
    token
}
