use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Duplicate credential: {0}")]
    DuplicateCredential(String),

    // Roster errors
    #[error("Duplicate person id: {0}")]
    DuplicatePerson(u32),

    #[error("Administrative credential {0} is also assigned to a person")]
    AdminCredentialAssigned(String),

    // Parsing errors
    #[error("Unknown reader: {0}")]
    UnknownReader(String),

    #[error("Unknown system mode: {0}")]
    UnknownMode(String),

    #[error("Invalid location code: {code}")]
    InvalidLocation { code: u8 },
}

pub type Result<T> = std::result::Result<T, Error>;
