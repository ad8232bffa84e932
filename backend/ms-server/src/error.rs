use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] ms_config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] ms_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] ms_auth::AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger error: {message}")]
    Logger { message: String },
}

impl ServerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Database(e) => e.error_code(),
            Self::Auth(e) => e.error_code(),
            Self::Io(_) => "IO_ERROR",
            Self::Logger { .. } => "LOGGER_INIT_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
