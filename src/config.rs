use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directory::{LdapOption, OptionValue};
use crate::error::Result;


pub const DEFAULT_SERVER_PORT: u16 = 389;
pub const DEFAULT_PROTOCOL_VERSION: u32 = 3;


fn default_server_port() -> u16 { DEFAULT_SERVER_PORT }
fn default_protocol_version() -> u32 { DEFAULT_PROTOCOL_VERSION }


#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct AdditionalOption {
    pub id: u32,
    pub value: OptionValue,
}
impl AdditionalOption {
    pub fn option(&self) -> LdapOption { LdapOption::from_id(self.id) }
}


/// Where and how to connect.
///
/// ```toml
/// server_name = "corp.example.com"
/// server_port = 389
///
/// [[additional_options]]
/// id = 0x5005
/// value = 10
/// ```
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LdapConfiguration {
    pub server_name: String,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// The root of all searches; derived from `server_name` if unset.
    #[serde(default)]
    pub server_dn: Option<String>,

    /// Only version 3 is spoken; other values are ignored with a warning.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,

    #[serde(default)]
    pub additional_options: Vec<AdditionalOption>,
}
impl LdapConfiguration {
    pub fn new<S: Into<String>>(server_name: S) -> Self {
        Self {
            server_name: server_name.into(),
            server_port: DEFAULT_SERVER_PORT,
            server_dn: None,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            additional_options: Vec::new(),
        }
    }

    pub fn with_server_port(mut self, server_port: u16) -> Self {
        self.server_port = server_port;
        self
    }

    pub fn with_server_dn<S: Into<String>>(mut self, server_dn: S) -> Self {
        self.server_dn = Some(server_dn.into());
        self
    }

    pub fn with_protocol_version(mut self, protocol_version: u32) -> Self {
        self.protocol_version = protocol_version;
        self
    }

    pub fn with_additional_option(mut self, id: u32, value: OptionValue) -> Self {
        self.additional_options.push(AdditionalOption { id, value });
        self
    }

    pub fn from_toml_str(toml_string: &str) -> Result<Self> {
        Ok(toml::from_str(toml_string)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let toml_string = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_string)
    }

    /// The configured server DN, or `DC=` components made from the server name.
    pub fn resolve_server_dn(&self) -> String {
        if let Some(server_dn) = &self.server_dn {
            return server_dn.clone();
        }
        self.server_name
            .split('.')
            .map(|segment| format!("DC={}", segment))
            .collect::<Vec<String>>()
            .join(",")
    }
}


#[derive(Clone, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ClientCredentials {
    pub id: String,
    pub passcode: String,
}
impl ClientCredentials {
    pub fn new<I: Into<String>, P: Into<String>>(id: I, passcode: P) -> Self {
        Self {
            id: id.into(),
            passcode: passcode.into(),
        }
    }

    pub fn from_toml_str(toml_string: &str) -> Result<Self> {
        Ok(toml::from_str(toml_string)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let toml_string = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_string)
    }
}
impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("id", &self.id)
            .field("passcode", &"<redacted>")
            .finish()
    }
}
