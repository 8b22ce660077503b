use std::path::PathBuf;

/// Recoverable errors of the input layer.
///
/// Everything that can go wrong during the solve itself is an invariant
/// violation (a driver bug) and panics instead; see the assertions in
/// [`crate::index::FeatureStore`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read dense multicut instance {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed instance: {0}")]
    Malformed(String),

    #[error("dist offset can only be >= 0, got {0}")]
    NegativeOffset(f32),
}
