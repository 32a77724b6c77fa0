//! The seam between this crate and the directory protocol transport.
//!
//! A [`Transport`] opens connections; each connection is a
//! [`DirectoryHandle`] which is owned by exactly one connector and only ever
//! lent out for the duration of one call.


use std::fmt;

use async_trait::async_trait;
use ldap3::SearchEntry;


/// How deep below the base a search looks.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SearchScope {
    /// The base and all of its descendants.
    Subtree,

    /// Only the immediate children of the base.
    OneLevel,
}
impl SearchScope {
    pub fn to_ldap3(self) -> ldap3::Scope {
        match self {
            Self::Subtree => ldap3::Scope::Subtree,
            Self::OneLevel => ldap3::Scope::OneLevel,
        }
    }
}


/// Numeric connection option identifiers, numbered as in OpenLDAP's `ldap.h`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LdapOption {
    Referrals,
    ProtocolVersion,
    NetworkTimeout,
    Other(u32),
}
impl LdapOption {
    pub const REFERRALS_ID: u32 = 0x0008;
    pub const PROTOCOL_VERSION_ID: u32 = 0x0011;
    pub const NETWORK_TIMEOUT_ID: u32 = 0x5005;

    pub fn from_id(id: u32) -> Self {
        match id {
            Self::REFERRALS_ID => Self::Referrals,
            Self::PROTOCOL_VERSION_ID => Self::ProtocolVersion,
            Self::NETWORK_TIMEOUT_ID => Self::NetworkTimeout,
            other => Self::Other(other),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::Referrals => Self::REFERRALS_ID,
            Self::ProtocolVersion => Self::PROTOCOL_VERSION_ID,
            Self::NetworkTimeout => Self::NETWORK_TIMEOUT_ID,
            Self::Other(id) => *id,
        }
    }

    /// Options the connector sets itself and never takes from configuration.
    pub fn is_managed(&self) -> bool {
        matches!(self, Self::Referrals | Self::ProtocolVersion)
    }
}


#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}
impl OptionValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Boolean(b) => Some(if *b { 1 } else { 0 }),
            Self::Integer(i) => Some(*i),
            Self::Text(t) => t.parse().ok(),
        }
    }
}
impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(t) => write!(f, "{:?}", t),
        }
    }
}


/// What the transport knows about the last failed operation.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Diagnostic {
    pub code: i32,
    pub short_message: String,
    pub extended_message: String,
}
impl Diagnostic {
    pub fn new<S: Into<String>, E: Into<String>>(code: i32, short_message: S, extended_message: E) -> Self {
        Self {
            code,
            short_message: short_message.into(),
            extended_message: extended_message.into(),
        }
    }
}
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}. {}.", self.code, self.short_message, self.extended_message)
    }
}


/// The read-only diagnostic side of a handle.
pub trait HandleDiagnostics {
    /// Whether the handle still refers to an open connection.
    fn is_valid(&self) -> bool;

    fn last_error(&self) -> Diagnostic;
}


#[async_trait]
pub trait DirectoryHandle: HandleDiagnostics + Send {
    /// The transport's own representation of a search result before it is
    /// turned into entries.
    type RawResult: Send;

    fn set_option(&mut self, option: LdapOption, value: &OptionValue);

    async fn bind(&mut self, identity: &str, passcode: &str) -> bool;

    /// Returns `None` if the operation failed; details are then available
    /// through [`HandleDiagnostics::last_error`].
    async fn search(&mut self, scope: SearchScope, base_dn: &str, filter: &str, attributes: &[&str]) -> Option<Self::RawResult>;

    fn get_entries(&mut self, raw_result: Self::RawResult) -> Vec<SearchEntry>;

    /// Closes the connection. The handle is invalid afterwards.
    async fn release(&mut self);
}


#[async_trait]
pub trait Transport {
    type Handle: DirectoryHandle;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Handle, Diagnostic>;
}


#[cfg(test)]
mod tests {
    use super::{Diagnostic, LdapOption, OptionValue};

    #[test]
    fn test_option_ids() {
        assert_eq!(LdapOption::from_id(0x11), LdapOption::ProtocolVersion);
        assert_eq!(LdapOption::from_id(8), LdapOption::Referrals);
        assert_eq!(LdapOption::from_id(0x5005), LdapOption::NetworkTimeout);
        assert_eq!(LdapOption::from_id(0x32), LdapOption::Other(0x32));
        assert_eq!(LdapOption::Other(0x32).id(), 0x32);
        assert!(LdapOption::ProtocolVersion.is_managed());
        assert!(!LdapOption::NetworkTimeout.is_managed());
    }

    #[test]
    fn test_option_value() {
        assert_eq!(OptionValue::Boolean(true).as_integer(), Some(1));
        assert_eq!(OptionValue::Text("15".to_owned()).as_integer(), Some(15));
        assert_eq!(OptionValue::Text("soon".to_owned()).as_integer(), None);
    }

    #[test]
    fn test_diagnostic_format() {
        let diagnostic = Diagnostic::new(49, "Invalid credentials", "80090308: LdapErr: DSID-0C09044E");
        assert_eq!(diagnostic.to_string(), "49: Invalid credentials. 80090308: LdapErr: DSID-0C09044E.");
    }
}
