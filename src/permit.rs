//! Permission gate for administrative actions (seeding, start, results, restart).

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PermitError {
    #[error("admin key required")]
    MissingKey,
    #[error("you don't have permission to do this")]
    Denied,
}

/// Decides whether the caller presenting `key` may run an administrative action.
pub trait Permit: Send + Sync {
    fn has_permit(&self, key: Option<&str>) -> Result<(), PermitError>;
}

/// Allows callers presenting the configured key. With no key configured everyone is allowed.
#[derive(Clone, Debug, Default)]
pub struct AdminKeyPermit {
    key: Option<String>,
}

impl AdminKeyPermit {
    pub fn new(key: Option<String>) -> Self {
        Self { key }
    }
}

impl Permit for AdminKeyPermit {
    fn has_permit(&self, key: Option<&str>) -> Result<(), PermitError> {
        match (&self.key, key) {
            (None, _) => Ok(()),
            (Some(_), None) => Err(PermitError::MissingKey),
            (Some(expected), Some(given)) if expected == given => Ok(()),
            (Some(_), Some(_)) => Err(PermitError::Denied),
        }
    }
}
