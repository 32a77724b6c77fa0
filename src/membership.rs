//! Transitive group membership.


use std::collections::HashSet;

use tracing::debug;
use unicase::UniCase;

use crate::directory::DirectoryHandle;
use crate::entry::Entry;
use crate::error::{LdapError, Result};
use crate::filter::SearchFilter;
use crate::message::BuildErrorMessage;
use crate::search::SearchProvider;


const GROUP_OBJECT_CLASS: &str = "Group";
const ATTRIBUTE_MEMBER: &str = "member";
const ATTRIBUTE_NAME: &str = "name";
const MEMBERSHIP_ATTRIBUTES: [&str; 2] = ["dn", ATTRIBUTE_NAME];


/// Finds out whether an entry is a direct or indirect member of a group.
pub struct MembershipDeterminator<'a, H: DirectoryHandle> {
    search_provider: SearchProvider<'a, H>,
}
impl<'a, H: DirectoryHandle> MembershipDeterminator<'a, H> {
    pub fn new(handle: &'a mut H, server_dn: &'a str, error_message_builder: &'a dyn BuildErrorMessage) -> Result<Self> {
        if !handle.is_valid() {
            return Err(LdapError::InvalidHandle);
        }
        Ok(Self {
            search_provider: SearchProvider::new(handle, server_dn, error_message_builder)?,
        })
    }

    /// Whether `entry` is a member of a group called `group_name`, directly or
    /// through any chain of nested groups.
    ///
    /// The groups containing an entry are looked up with one subtree search
    /// each; the walk goes depth-first, and every group is visited at most
    /// once so cyclic nesting terminates.
    pub async fn is_in_group(&mut self, entry: &Entry, group_name: &str) -> Result<bool> {
        let mut visited: HashSet<UniCase<String>> = HashSet::new();
        visited.insert(UniCase::new(entry.dn().to_owned()));
        let mut pending = vec![entry.dn().to_owned()];
        let mut round_trips = 0usize;

        while let Some(member_dn) = pending.pop() {
            let groups = self.direct_groups(&member_dn).await?;
            round_trips += 1;
            if groups.is_empty() {
                continue;
            }

            let found = groups.iter()
                .any(|group| group.values(ATTRIBUTE_NAME).map_or(false, |names| names.iter().any(|n| n == group_name)));
            if found {
                debug!(dn = entry.dn(), group_name, round_trips, "membership found");
                return Ok(true);
            }

            // reversed so that the first group found is explored first
            for group in groups.iter().rev() {
                if visited.insert(UniCase::new(group.dn().to_owned())) {
                    pending.push(group.dn().to_owned());
                } else {
                    debug!(dn = group.dn(), "group already visited");
                }
            }
        }

        debug!(dn = entry.dn(), group_name, round_trips, "membership not found");
        Ok(false)
    }

    async fn direct_groups(&mut self, member_dn: &str) -> Result<Vec<Entry>> {
        let filter = SearchFilter::and([
            SearchFilter::equal_to("objectClass", GROUP_OBJECT_CLASS),
            SearchFilter::equal_to(ATTRIBUTE_MEMBER, member_dn),
        ]);
        let groups = self.search_provider
            .search(&filter.filter_string(), false, None, &MEMBERSHIP_ATTRIBUTES)
            .await?;
        Ok(groups.to_vec())
    }
}
