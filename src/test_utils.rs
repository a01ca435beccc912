//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    use crate::core::store::NewPackage;
    use crate::infra::layout;

    /// Generate a valid package name (lowercase alphanumeric with hyphens)
    pub fn package_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,30}[a-z0-9]?".prop_filter("Name must not be empty", |s| !s.is_empty())
    }

    /// Generate a dotted version string such as `6.1.7`
    pub fn version() -> impl Strategy<Value = String> {
        proptest::collection::vec(0u32..100, 1..4).prop_map(|parts| {
            parts
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
        })
    }

    /// Generate a source URL template with one or two `{x}` placeholders
    pub fn source_url() -> impl Strategy<Value = String> {
        ("[a-z]{3,10}", prop::bool::ANY).prop_map(|(domain, two)| {
            if two {
                format!("https://{domain}.org/v{{x}}.x/{domain}-{{x}}.tar.xz")
            } else {
                format!("https://{domain}.org/{domain}-{{x}}.tar.gz")
            }
        })
    }

    /// Generate a complete package to add
    pub fn new_package() -> impl Strategy<Value = NewPackage> {
        (package_name(), version(), source_url()).prop_map(|(name, version, source_url)| {
            NewPackage {
                repository_path: layout::stored_repository_path("core", &name),
                pkgbuild_path: layout::stored_pkgbuild_path(&name),
                upstream_url: format!("https://archlinux.org/packages/core/x86_64/{name}/"),
                source_type: "https".to_string(),
                source_url,
                version,
                name,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::core::record::URL_PLACEHOLDER;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_package_name_generator(name in package_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn test_version_generator(version in version()) {
            for part in version.split('.') {
                prop_assert!(part.parse::<u32>().is_ok());
            }
        }

        #[test]
        fn test_source_url_has_placeholder(url in source_url()) {
            prop_assert!(url.contains(URL_PLACEHOLDER));
        }
    }
}
