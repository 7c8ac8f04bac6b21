//! Client error types.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("caster host is not set")]
    MissingHost,

    #[error("caster mount point is not set")]
    MissingMountPoint,

    #[error("caster user is not set (use an empty string for anonymous access)")]
    MissingUser,

    #[error("forced shutdown is latched; clear it before re-enabling")]
    ForcedShutdown,

    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ClientError::MissingHost.to_string(), "caster host is not set");
        assert_eq!(
            ClientError::MissingMountPoint.to_string(),
            "caster mount point is not set"
        );
        assert_eq!(
            ClientError::Config("bad toml".into()).to_string(),
            "config error: bad toml"
        );
    }
}
