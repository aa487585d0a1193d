// Defaults and cellar API path patterns

/// Default URL scheme
pub const DEFAULT_SCHEME: &str = "https";

/// Default API host
pub const DEFAULT_HOST: &str = "cellar.goa.design";

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 20000;

/// Path patterns of the cellar API. Callers substitute the ids themselves;
/// the client sends whatever path it is given.
pub mod cellar_api_path {
    // Account
    pub const ACCOUNTS: &str = "/cellar/accounts";
    pub const ACCOUNT: &str = "/cellar/accounts/:accountID";

    // Bottle
    pub const BOTTLES: &str = "/cellar/accounts/:accountID/bottles";
    pub const BOTTLE: &str = "/cellar/accounts/:accountID/bottles/:bottleID";
    pub const BOTTLE_RATE: &str = "/cellar/accounts/:accountID/bottles/:bottleID/actions/rate";
}
