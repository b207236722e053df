//! Player attribution for score submissions.
//!
//! The display name is an opaque string for leaderboard attribution, not
//! an authentication mechanism. A failed lookup degrades to [`ANONYMOUS`].

/// Attribution used when no identity can be resolved.
pub const ANONYMOUS: &str = "anonymous";

/// Supplies the current player's display name.
pub trait IdentityProvider: Send {
    /// `None` when no identity is available; callers fall back to
    /// [`ANONYMOUS`] rather than failing.
    fn display_name(&self) -> Option<String>;
}

/// Resolves the display name from the `USER` environment variable.
#[derive(Debug, Default)]
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn display_name(&self) -> Option<String> {
        std::env::var("USER").ok().filter(|name| !name.is_empty())
    }
}

/// A fixed display name, e.g. from a `--name` flag.
#[derive(Debug)]
pub struct FixedIdentity(pub String);

impl IdentityProvider for FixedIdentity {
    fn display_name(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
