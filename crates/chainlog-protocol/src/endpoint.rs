/// Version of the ledger API, reported by the status route and in the
/// `Symbiont-Ledger-Version` response header.
pub const LEDGER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP endpoint paths.
pub mod endpoints {
    /// Prefix for reading (`GET {prefix}/{index}`) and appending
    /// (`POST {prefix}`) transactions.
    pub const TRANSACTIONS: &str = "/transactions";
    pub const STATUS: &str = "/";

    /// Path of a read starting at `index`.
    pub fn read_path(index: i64) -> String {
        format!("{TRANSACTIONS}/{index}")
    }
}

/// HTTP header names.
///
/// Header names are case-insensitive; these are the lowercase forms that
/// hyper puts on the wire.
pub mod headers {
    /// Hex-encoded network seed. Optional on requests; a non-empty value that
    /// differs from the ledger's seed gets the request rejected. Always set on
    /// responses to the ledger's seed.
    pub const NETWORK_SEED: &str = "symbiont-network-seed";
    pub const LEDGER_VERSION: &str = "symbiont-ledger-version";
}
