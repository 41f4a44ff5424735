//! Build metadata shared by the server, the admin routes and the logger.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REVISION: Option<&str> = option_env!("SANGRAH_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");

/// The application name used in the page footer.
pub const APP_NAME: &str = "Agentic App";
