use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeskErrorType {
    NotFound,
    NotADirectory,
    IsADirectory,
    AlreadyExists,
    InvalidPath,
    InvalidContent,
    IOError,
    InternalError,
}

impl From<DeskErrorType> for warp::http::StatusCode {
    fn from(error_type: DeskErrorType) -> Self {
        match error_type {
            DeskErrorType::NotFound => warp::http::StatusCode::NOT_FOUND,
            DeskErrorType::AlreadyExists => warp::http::StatusCode::CONFLICT,
            DeskErrorType::NotADirectory
            | DeskErrorType::IsADirectory
            | DeskErrorType::InvalidPath
            | DeskErrorType::InvalidContent => warp::http::StatusCode::BAD_REQUEST,
            _ => warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A labeled failure carrying the error kind and the offending name or path.
#[derive(Debug, Clone)]
pub struct DeskError {
    pub error_type: DeskErrorType,
    pub message: String,
}

impl warp::Reply for DeskError {
    fn into_response(self) -> warp::reply::Response {
        let status: warp::http::StatusCode = self.error_type.into();
        warp::reply::with_status(warp::reply::json(&self.to_string()), status).into_response()
    }
}

impl DeskError {
    pub fn new(error_type: DeskErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
        }
    }
}

impl std::fmt::Display for DeskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.error_type, self.message)
    }
}

impl From<std::io::Error> for DeskError {
    fn from(error: std::io::Error) -> Self {
        Self {
            error_type: DeskErrorType::IOError,
            message: error.to_string(),
        }
    }
}

impl From<sled::Error> for DeskError {
    fn from(error: sled::Error) -> Self {
        Self {
            error_type: DeskErrorType::IOError,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            error_type: DeskErrorType::InternalError,
            message: error.to_string(),
        }
    }
}

impl Error for DeskError {}

pub type Result<T> = std::result::Result<T, DeskError>;
