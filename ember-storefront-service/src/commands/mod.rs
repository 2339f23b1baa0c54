use thiserror::Error;

pub mod cart;
pub mod catalog;
pub mod newsletter;
pub mod orders;
pub mod reviews;
pub mod users;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Unexpected internal error")]
    Hash(#[source] argon2::password_hash::Error),
    #[error("Unexpected internal error")]
    Database(#[from] diesel::result::Error),
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Mina@Example.COM "), "mina@example.com");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }
}
