//! Links into the external log viewer.
//!
//! The viewer is a separate application; this service only builds links of the form
//! `http://<domain>:<port>/#/logs/<filename>` and reads filenames back out of pasted links.

use crate::filename::is_storable_name;

/// Fixed viewer link prefix, built once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerUrl {
    base: String,
}

impl ViewerUrl {
    pub fn new(domain_name: &str, port: u16) -> Self {
        Self {
            base: format!("http://{domain_name}:{port}/#/logs/"),
        }
    }

    /// The prefix every stored file's link starts with (ends in `/`).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Link to a stored file in the viewer.
    pub fn link_for(&self, filename: &str) -> String {
        format!("{}{}", self.base, filename)
    }
}

/// Pull a stored filename out of a pasted viewer link.
///
/// Takes whatever follows the last `/` and accepts it only if it is a `.eval` name. Scheme and
/// host are not checked, so any string ending in `/<name>.eval` resolves.
pub fn extract_filename(url: &str) -> Option<&str> {
    let segment = url.trim().rsplit('/').next()?;
    is_storable_name(segment).then_some(segment)
}
