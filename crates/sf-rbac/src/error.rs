//! Error types for RBAC parsing

/// Errors raised while interpreting backend-issued RBAC data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RbacError {
    /// Token is not part of the known action enumeration
    #[error("unknown action token: '{0}'")]
    UnknownAction(String),

    /// Capability name is not recognized
    #[error("unknown capability: '{0}'")]
    UnknownCapability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rbac_error_display() {
        let err = RbacError::UnknownAction("x:y".to_string());
        assert_eq!(err.to_string(), "unknown action token: 'x:y'");
    }
}
