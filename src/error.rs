//! Error type shared by the loader, topology decoder and scene.
//!
//! Core code returns `Result<_, AtlasError>`; the wasm facade converts these
//! into `JsError` at the boundary.

use thiserror::Error;

/// Everything that can go wrong while building or driving an atlas.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// A resource was not valid JSON or did not match the expected shape.
    #[error("invalid JSON in {resource}: {source}")]
    Json {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The topology has no object with the requested name.
    #[error("topology has no object named `{0}`")]
    MissingObject(String),

    /// A TopoJSON geometry has an unknown or malformed type.
    #[error("unsupported topology geometry: {0}")]
    UnsupportedGeometry(String),

    /// An arc reference points outside the topology's arc table.
    #[error("arc index {0} is out of range")]
    InvalidArc(i64),

    /// A link endpoint does not name any airport.
    #[error("link {index} references unknown airport `{reference}`")]
    UnresolvedLink { index: usize, reference: String },

    /// A mode selection carried something other than `Force` or `Map`.
    #[error("unknown layout mode `{0}` (expected `Force` or `Map`)")]
    UnknownMode(String),

    /// A resource could not be fetched.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The page is missing something the DOM binding needs.
    #[error("DOM error: {0}")]
    Dom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AtlasError::UnknownMode("Globe".to_string());
        assert_eq!(
            err.to_string(),
            "unknown layout mode `Globe` (expected `Force` or `Map`)"
        );

        let err = AtlasError::UnresolvedLink {
            index: 3,
            reference: "XYZ".to_string(),
        };
        assert_eq!(err.to_string(), "link 3 references unknown airport `XYZ`");
    }

    #[test]
    fn test_json_error_has_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = AtlasError::Json {
            resource: "airports",
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("invalid JSON in airports"));
    }
}
