/// Runtime configuration shared by the token signer and verifier.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Issuer claim (iss) stamped into and expected from every token.
    pub issuer: String,
    /// Lifetime of an issued token in seconds.
    pub ttl_seconds: i64,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl TokenConfig {
    /// Construct config with a one hour lifetime and no expiry leeway.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ttl_seconds: 3600,
            leeway_seconds: 0,
        }
    }

    /// Adjust the token lifetime.
    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}
