use std::io;

use thiserror::Error;


#[derive(Debug, Error)]
pub enum LdapError {
    #[error("The LDAP connection has been failed. {0}.")]
    ConnectionFailed(String),

    #[error("The LDAP authentication has been failed. {0}.")]
    ConnectionBindingFailed(String),

    #[error("The LDAP connection has already been bound.")]
    ConnectionBound,

    #[error("The LDAP connection has not been bound.")]
    ConnectionNotBound,

    #[error("The LDAP connection has already been established.")]
    AlreadyConnected,

    #[error("The LDAP search failed. {0}.")]
    SearchFailed(String),

    #[error("The LDAP handle is invalid. An open LDAP connection handle is expected.")]
    InvalidHandle,

    #[error("The LDAP entry with the index `{0}` does not exist.")]
    EntryNotFound(usize),

    /// A write or erase was attempted on an append-only collection.
    #[error("The method `{0}` is not supported on an append-only collection.")]
    UnsupportedMutation(&'static str),

    #[error("LDAP configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
impl LdapError {
    /// Errors caused by calling the API in the wrong order or with the wrong
    /// arguments; these are bugs in the caller, not failures of the server.
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionBound
                | Self::ConnectionNotBound
                | Self::AlreadyConnected
                | Self::InvalidHandle
                | Self::EntryNotFound(_)
                | Self::UnsupportedMutation(_)
        )
    }

    pub const fn is_operational_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::ConnectionBindingFailed(_) | Self::SearchFailed(_)
        )
    }
}
impl From<toml::de::Error> for LdapError {
    fn from(value: toml::de::Error) -> Self { Self::Configuration(value.to_string()) }
}


pub type Result<T> = std::result::Result<T, LdapError>;
