use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum KinaseMotifError {
    /// The motif table could not be built. This is a startup failure, never
    /// a per-sequence one.
    Configuration(String),
    Io {
        path: Option<PathBuf>,
        source: std::io::Error,
    },
    Csv(csv::Error),
    Json(serde_json::Error),
    /// The disorder service holds no annotation for this identifier.
    NotFound(String),
    #[cfg(feature = "disorder")]
    Http(reqwest::Error),
}

impl KinaseMotifError {
    pub fn io_at<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: Some(path.as_ref().to_path_buf()),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl std::fmt::Display for KinaseMotifError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "IO error on {}: {}", path.display(), source),
            Self::Io { path: None, source } => write!(f, "IO error: {}", source),
            Self::Csv(e) => write!(f, "Table writing error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::NotFound(seqid) => {
                write!(f, "Sequence id {} has not been annotated in the database", seqid)
            }
            #[cfg(feature = "disorder")]
            Self::Http(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for KinaseMotifError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(e) => Some(e),
            Self::Json(e) => Some(e),
            #[cfg(feature = "disorder")]
            Self::Http(e) => Some(e),
            Self::Configuration(_) | Self::NotFound(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KinaseMotifError>;

impl From<std::io::Error> for KinaseMotifError {
    fn from(x: std::io::Error) -> Self {
        Self::Io {
            path: None,
            source: x,
        }
    }
}

impl From<csv::Error> for KinaseMotifError {
    fn from(x: csv::Error) -> Self {
        Self::Csv(x)
    }
}

impl From<serde_json::Error> for KinaseMotifError {
    fn from(x: serde_json::Error) -> Self {
        Self::Json(x)
    }
}

impl From<regex::Error> for KinaseMotifError {
    fn from(x: regex::Error) -> Self {
        Self::Configuration(x.to_string())
    }
}

#[cfg(feature = "disorder")]
impl From<reqwest::Error> for KinaseMotifError {
    fn from(x: reqwest::Error) -> Self {
        Self::Http(x)
    }
}
