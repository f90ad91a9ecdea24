pub(crate) const DEFAULT_USER_AGENT: &str = concat!("thor-loadtest/", env!("CARGO_PKG_VERSION"));
