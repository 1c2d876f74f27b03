//! Identity provider seam
//!
//! The client never runs an authentication flow itself; it consumes an
//! opaque subject from whatever identity provider the deployment uses.
//! Operations that need a user treat a missing subject as "signed out" and
//! become no-ops.

use std::sync::Arc;

/// Supplies the opaque authenticated-user identifier
///
/// `None` means no user is signed in.
pub trait IdentityProvider: Send + Sync {
    /// The authenticated subject, if any
    fn subject(&self) -> Option<String>;
}

/// Identity backed by configuration or the environment
///
/// Resolution order: explicit configured subject, then the
/// `GENIEX_USER_ID` environment variable, otherwise signed out.
///
/// # Examples
///
/// ```
/// use geniex::identity::{IdentityProvider, StaticIdentity};
///
/// let identity = StaticIdentity::new(Some("user-1".to_string()));
/// assert_eq!(identity.subject().as_deref(), Some("user-1"));
/// ```
pub struct StaticIdentity {
    subject: Option<String>,
}

impl StaticIdentity {
    /// Creates an identity with a fixed subject (or signed out for `None`)
    pub fn new(subject: Option<String>) -> Self {
        Self { subject }
    }

    /// Resolves the subject from configuration with an environment fallback
    pub fn resolve(configured: Option<&str>) -> Self {
        let subject = configured
            .map(str::to_string)
            .or_else(|| std::env::var("GENIEX_USER_ID").ok())
            .filter(|s| !s.trim().is_empty());
        Self { subject }
    }

    /// Convenience constructor returning a shareable trait object
    pub fn shared(subject: Option<String>) -> Arc<dyn IdentityProvider> {
        Arc::new(Self::new(subject))
    }
}

impl IdentityProvider for StaticIdentity {
    fn subject(&self) -> Option<String> {
        self.subject.clone()
    }
}
