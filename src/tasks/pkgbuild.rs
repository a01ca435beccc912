//! PKGBUILD editing
//!
//! Only the `pkgver=` and `sha256sums=` assignments are rewritten; every
//! other line is preserved byte for byte.

use regex::Regex;
use std::path::Path;

use crate::error::FilesystemError;
use crate::infra::filesystem;

/// File name of the build recipe
pub const PKGBUILD: &str = "PKGBUILD";

/// Replace every `pkgver=` line
pub fn set_pkgver(content: &str, version: &str) -> String {
    replace_assignment(content, "pkgver", &format!("pkgver={version}"))
}

/// Replace every `sha256sums=` line with `sha256sums=( <sums...> )`
pub fn set_sha256sums(content: &str, sums: &[&str]) -> String {
    replace_assignment(
        content,
        "sha256sums",
        &format!("sha256sums=( {} )", sums.join(" ")),
    )
}

fn replace_assignment(content: &str, key: &str, line: &str) -> String {
    // key is one of the literals above
    let pattern = Regex::new(&format!(r"(?m)^{key}=.*$")).expect("assignment pattern is valid");
    pattern
        .replace_all(content, regex::NoExpand(line))
        .into_owned()
}

/// Rewrite `<dir>/PKGBUILD` with a new version and checksums
pub fn rewrite_pkgbuild(dir: &Path, version: &str, sums: &[&str]) -> Result<(), FilesystemError> {
    let path = dir.join(PKGBUILD);
    let content = filesystem::read_file(&path)?;
    let updated = set_sha256sums(&set_pkgver(&content, version), sums);
    filesystem::write_file_atomic(&path, updated.as_bytes())
}

/// Header written into the PKGBUILD of a new package
pub fn template(name: &str) -> String {
    format!(
        "# Package Information\n\
         # ------------\n\
         # PKGBUILD for {name} package\n\
         #\n\
         # Maintainer: Your Name <example@email.com>\n\
         # ------------------------------------------------------------------\n"
    )
}
