//! Default configuration values

/// Maximum number of download retry attempts
pub const MAX_DOWNLOAD_RETRIES: u32 = 3;

/// Base delay for exponential backoff between retries (milliseconds)
pub const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Request timeout for downloads and upstream pages (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Database location relative to the project root
pub const DATABASE_PATH: &str = "db/db.json";

/// Project config file name, looked up in the project root
pub const PROJECT_CONFIG_FILE: &str = "alarmpkg.toml";

/// Record that only serves as a template and is never synced
pub const TEMPLATE_PACKAGE: &str = "example-package";

/// Substrings stripped from upstream version tokens
pub const VERSION_NOISE: &[&str] = &[".arch1-1"];

/// Target architecture of the port
pub const TARGET_ARCH: &str = "aarch64";

/// Suffixes of the artifacts a build leaves in the PKGBUILD directory
pub const ARTIFACT_SUFFIXES: &[&str] = &[".pkg.tar.zst", ".pkg.tar.zst.sig"];

/// Sign packages with `makepkg --sign` unless configured otherwise
pub const SIGN_PACKAGES: bool = true;
