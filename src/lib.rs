//! Directory access on top of `ldap3`: connection lifecycle, composable
//! search filters, searches returning typed entries, and transitive group
//! membership.
//!
//! ```no_run
//! # async fn run() -> ldapconnector::error::Result<()> {
//! use ldapconnector::{ClientCredentials, Ldap3Transport, LdapConfiguration, LdapConnector, SearchFilter};
//!
//! let configuration = LdapConfiguration::new("corp.example.com");
//! let mut connector = LdapConnector::open(&Ldap3Transport::new(), configuration).await?;
//! connector.authenticate(&ClientCredentials::new("jdoe", "hunter2")).await?;
//!
//! let filter = SearchFilter::and([
//!     SearchFilter::equal_to("objectClass", "person"),
//!     SearchFilter::equal_to("sAMAccountName", "jdoe"),
//! ]);
//! if let Some(user) = connector.search_first(&filter.filter_string(), false, None, &[]).await? {
//!     println!("admin: {}", connector.is_in_group(&user, "Domain Admins").await?);
//! }
//! connector.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod directory;
pub mod entry;
pub mod error;
pub mod filter;
pub mod ldap;
pub mod ldif;
pub mod membership;
pub mod message;
pub mod search;

#[cfg(test)]
mod mock;


pub use crate::config::{ClientCredentials, LdapConfiguration};
pub use crate::connector::{ConnectorState, LdapConnector};
pub use crate::entry::{Entry, EntryCollection};
pub use crate::error::LdapError;
pub use crate::filter::SearchFilter;
pub use crate::ldap::Ldap3Transport;
