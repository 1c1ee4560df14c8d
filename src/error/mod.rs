pub mod domain_error;

use thiserror::Error;

use self::domain_error::DomainError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("Domain Error. Error: '{0}'.")]
    Domain(DomainError),
    #[error("Internal Error. Error: '{0}'.")]
    Internal(String),
    #[error("Could not persist the scores. Error: '{0}'.")]
    Persistence(String),
    #[error("Invalid configuration. Error: '{0}'.")]
    Configuration(String),
}

impl Error {
    pub fn log_and_create_internal(message: &str) -> Error {
        log::error!("{message}");
        Error::Internal(message.to_string())
    }

    pub fn log_and_create_persistence(message: &str) -> Error {
        log::error!("{message}");
        Error::Persistence(message.to_string())
    }

    /// User errors are reported back to the player, everything else is an operational problem.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Domain(_))
    }
}

impl From<DomainError> for Error {
    fn from(error: DomainError) -> Self {
        Error::Domain(error)
    }
}
