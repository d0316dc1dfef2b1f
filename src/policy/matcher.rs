use super::config::AllowList;

impl AllowList {
    /// True if any pattern matches somewhere in the license string.
    pub fn permits(&self, license: &str) -> bool {
        self.patterns().iter().any(|pattern| pattern.regex.is_match(license))
    }
}

/// A package is valid only if it declares at least one license and every
/// declared license is permitted. Evaluation stops at the first license that
/// no pattern accepts.
pub fn has_valid_license(licenses: &[String], allow_list: &AllowList) -> bool {
    !licenses.is_empty() && licenses.iter().all(|license| allow_list.permits(license))
}
