use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixError {
    #[error("No armature with bones was found")]
    NoArmature,

    #[error("No mesh inside the armature found")]
    NoMeshes,

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host bridges usually surface errors as plain strings.
impl From<FixError> for String {
    fn from(error: FixError) -> Self {
        error.to_string()
    }
}
