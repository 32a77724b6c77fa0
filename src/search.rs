//! Execution of searches and conversion of their results into entries.


use base64::Engine;
use ldap3::SearchEntry;
use tracing::{debug, warn};
use unicase::UniCase;

use crate::directory::{DirectoryHandle, SearchScope};
use crate::entry::{AttributeMap, Entry, EntryCollection};
use crate::error::{LdapError, Result};
use crate::message::BuildErrorMessage;


/// Runs searches on a borrowed connection handle.
///
/// Lives only as long as the call that created it.
pub struct SearchProvider<'a, H: DirectoryHandle> {
    handle: &'a mut H,
    server_dn: &'a str,
    error_message_builder: &'a dyn BuildErrorMessage,
}
impl<'a, H: DirectoryHandle> SearchProvider<'a, H> {
    pub fn new(handle: &'a mut H, server_dn: &'a str, error_message_builder: &'a dyn BuildErrorMessage) -> Result<Self> {
        if !handle.is_valid() {
            return Err(LdapError::InvalidHandle);
        }
        Ok(Self {
            handle,
            server_dn,
            error_message_builder,
        })
    }

    /// Issues the search and returns the transport's raw result.
    ///
    /// Searches the whole subtree below `context` (or the server DN), or only
    /// its immediate children if `first_level_only` is set. An empty
    /// `attributes` slice requests all attributes.
    pub async fn execute_query(&mut self, filter: &str, first_level_only: bool, context: Option<&str>, attributes: &[&str]) -> Result<H::RawResult> {
        let base_dn = context.unwrap_or(self.server_dn);
        let scope = if first_level_only { SearchScope::OneLevel } else { SearchScope::Subtree };

        match self.handle.search(scope, base_dn, filter, attributes).await {
            Some(raw_result) => Ok(raw_result),
            None => {
                let message = self.error_message_builder.build(&*self.handle)?;
                warn!(base_dn, filter, "search failed: {}", message);
                Err(LdapError::SearchFailed(message))
            },
        }
    }

    /// The first matching entry, if any.
    pub async fn search_first(&mut self, filter: &str, first_level_only: bool, context: Option<&str>, attributes: &[&str]) -> Result<Option<Entry>> {
        let raw_result = self.execute_query(filter, first_level_only, context, attributes).await?;
        let entries = self.convert(raw_result, true);
        Ok(entries.into_iter().next())
    }

    pub async fn search(&mut self, filter: &str, first_level_only: bool, context: Option<&str>, attributes: &[&str]) -> Result<EntryCollection> {
        let raw_result = self.execute_query(filter, first_level_only, context, attributes).await?;
        Ok(self.convert(raw_result, false))
    }

    fn convert(&mut self, raw_result: H::RawResult, first_only: bool) -> EntryCollection {
        let search_entries = self.handle.get_entries(raw_result);
        let boundary = upper_boundary(search_entries.len(), first_only);
        debug!(found = search_entries.len(), kept = boundary, "converting search result");

        search_entries
            .into_iter()
            .take(boundary)
            .map(normalize_entry)
            .collect()
    }
}


/// How many of `count` records are turned into entries.
///
/// All of them, or when only the first is wanted, none if there are none
/// and exactly one otherwise.
fn upper_boundary(count: usize, first_only: bool) -> usize {
    if !first_only {
        count
    } else if count == 0 {
        0
    } else {
        1
    }
}


/// Turns a raw record into an [`Entry`].
///
/// Values keep the order delivered by the server. Values which are not valid
/// UTF-8 are stored as standard base64.
pub fn normalize_entry(search_entry: SearchEntry) -> Entry {
    let mut data = AttributeMap::new();
    for (key, string_values) in search_entry.attrs {
        data.entry(UniCase::new(key))
            .or_insert_with(Vec::new)
            .extend(string_values);
    }
    for (key, bytes_values) in search_entry.bin_attrs {
        let values = data.entry(UniCase::new(key))
            .or_insert_with(Vec::new);
        for bytes_value in bytes_values {
            values.push(base64::engine::general_purpose::STANDARD.encode(bytes_value));
        }
    }
    Entry::new(search_entry.dn, data)
}
