//! The connection lifecycle.
//!
//! A connector starts out [`ConnectorState::Instantiated`], connects, binds,
//! and only then answers queries:
//!
//! ```text
//! Instantiated --connect--> Connected --authenticate--> Bound
//!      |                        |
//!      v                        v
//! ConnectionFailed        BindingFailed
//! ```
//!
//! Both failure states are final.


use std::fmt;

use tracing::{debug, info, warn};

use crate::config::{ClientCredentials, LdapConfiguration, DEFAULT_PROTOCOL_VERSION};
use crate::directory::{DirectoryHandle, LdapOption, OptionValue, Transport};
use crate::entry::{Entry, EntryCollection};
use crate::error::{LdapError, Result};
use crate::membership::MembershipDeterminator;
use crate::message::{BuildErrorMessage, ErrorMessageBuilder};
use crate::search::SearchProvider;


#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum ConnectorState {
    Instantiated = 0,
    ConnectionFailed = 1,
    Connected = 2,
    BindingFailed = 3,
    Bound = 4,
}
impl fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Instantiated => "instantiated",
            Self::ConnectionFailed => "connection failed",
            Self::Connected => "connected",
            Self::BindingFailed => "binding failed",
            Self::Bound => "bound",
        };
        f.write_str(name)
    }
}


pub struct LdapConnector<H: DirectoryHandle> {
    configuration: LdapConfiguration,
    server_dn: String,
    state: ConnectorState,
    handle: Option<H>,
    error_message_builder: Box<dyn BuildErrorMessage>,
}
impl<H: DirectoryHandle> LdapConnector<H> {
    pub fn new(configuration: LdapConfiguration) -> Self {
        let server_dn = configuration.resolve_server_dn();
        Self {
            configuration,
            server_dn,
            state: ConnectorState::Instantiated,
            handle: None,
            error_message_builder: Box::new(ErrorMessageBuilder),
        }
    }

    pub fn with_error_message_builder<B: BuildErrorMessage + 'static>(mut self, error_message_builder: B) -> Self {
        self.error_message_builder = Box::new(error_message_builder);
        self
    }

    /// Creates a connector and connects it right away.
    pub async fn open<T: Transport<Handle = H>>(transport: &T, configuration: LdapConfiguration) -> Result<Self> {
        let mut connector = Self::new(configuration);
        connector.connect(transport).await?;
        Ok(connector)
    }

    pub fn state(&self) -> ConnectorState { self.state }

    pub fn server_dn(&self) -> &str { &self.server_dn }

    pub fn configuration(&self) -> &LdapConfiguration { &self.configuration }

    pub async fn connect<T: Transport<Handle = H>>(&mut self, transport: &T) -> Result<()> {
        if self.state != ConnectorState::Instantiated {
            return Err(LdapError::AlreadyConnected);
        }

        let host = self.configuration.server_name.as_str();
        let port = self.configuration.server_port;
        let mut handle = match transport.connect(host, port).await {
            Ok(h) => h,
            Err(diagnostic) => {
                self.state = ConnectorState::ConnectionFailed;
                warn!(host, port, "connection failed: {}", diagnostic);
                return Err(LdapError::ConnectionFailed(diagnostic.to_string()));
            },
        };

        if self.configuration.protocol_version != DEFAULT_PROTOCOL_VERSION {
            warn!(
                "configured protocol version {} is not supported; using {}",
                self.configuration.protocol_version, DEFAULT_PROTOCOL_VERSION,
            );
        }
        handle.set_option(LdapOption::ProtocolVersion, &OptionValue::Integer(DEFAULT_PROTOCOL_VERSION.into()));
        handle.set_option(LdapOption::Referrals, &OptionValue::Integer(0));
        for additional_option in &self.configuration.additional_options {
            let option = additional_option.option();
            if option.is_managed() {
                warn!(option = option.id(), "ignoring additional option managed by the connector");
                continue;
            }
            debug!(option = option.id(), value = %additional_option.value, "setting additional option");
            handle.set_option(option, &additional_option.value);
        }

        self.handle = Some(handle);
        self.state = ConnectorState::Connected;
        info!(host, port, server_dn = %self.server_dn, "connected");
        Ok(())
    }

    /// Binds as `<id>@<server name>`.
    ///
    /// A failed bind is final for this connector.
    pub async fn authenticate(&mut self, credentials: &ClientCredentials) -> Result<()> {
        match self.state {
            ConnectorState::Bound => return Err(LdapError::ConnectionBound),
            ConnectorState::BindingFailed => {
                return Err(LdapError::ConnectionBindingFailed("A previous binding attempt has failed".to_owned()));
            },
            _ => {},
        }
        let handle = self.handle.as_mut()
            .ok_or(LdapError::InvalidHandle)?;

        let identity = format!("{}@{}", credentials.id, self.configuration.server_name);
        if !handle.bind(&identity, &credentials.passcode).await {
            self.state = ConnectorState::BindingFailed;
            let message = self.error_message_builder.build(&*handle)?;
            warn!(%identity, "binding failed: {}", message);
            return Err(LdapError::ConnectionBindingFailed(message));
        }

        self.state = ConnectorState::Bound;
        info!(%identity, "bound");
        Ok(())
    }

    fn ensure_bound(&self) -> Result<()> {
        if self.state != ConnectorState::Bound {
            return Err(LdapError::ConnectionNotBound);
        }
        Ok(())
    }

    pub async fn search_first(&mut self, filter: &str, first_level_only: bool, context: Option<&str>, attributes: &[&str]) -> Result<Option<Entry>> {
        self.ensure_bound()?;
        let handle = self.handle.as_mut().ok_or(LdapError::InvalidHandle)?;
        SearchProvider::new(handle, &self.server_dn, &*self.error_message_builder)?
            .search_first(filter, first_level_only, context, attributes)
            .await
    }

    pub async fn search(&mut self, filter: &str, first_level_only: bool, context: Option<&str>, attributes: &[&str]) -> Result<EntryCollection> {
        self.ensure_bound()?;
        let handle = self.handle.as_mut().ok_or(LdapError::InvalidHandle)?;
        SearchProvider::new(handle, &self.server_dn, &*self.error_message_builder)?
            .search(filter, first_level_only, context, attributes)
            .await
    }

    pub async fn is_in_group(&mut self, entry: &Entry, group_name: &str) -> Result<bool> {
        self.ensure_bound()?;
        let handle = self.handle.as_mut().ok_or(LdapError::InvalidHandle)?;
        MembershipDeterminator::new(handle, &self.server_dn, &*self.error_message_builder)?
            .is_in_group(entry, group_name)
            .await
    }

    /// Releases the connection.
    pub async fn close(mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release().await;
            debug!(state = %self.state, "connection released");
        }
    }
}
impl<H: DirectoryHandle> fmt::Debug for LdapConnector<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapConnector")
            .field("configuration", &self.configuration)
            .field("server_dn", &self.server_dn)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
