//! Directory entries as returned by searches.


use std::collections::BTreeMap;
use std::slice;

use unicase::UniCase;

use crate::error::{LdapError, Result};


/// Attribute name to values, in the order the server delivered them.
pub type AttributeMap = BTreeMap<UniCase<String>, Vec<String>>;


/// One directory object.
///
/// The distinguished name is also part of the data under the `dn` key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    dn: String,
    data: AttributeMap,
}
impl Entry {
    pub fn new(dn: String, mut data: AttributeMap) -> Self {
        data.insert(UniCase::new("dn".to_owned()), vec![dn.clone()]);
        Self {
            dn,
            data,
        }
    }

    pub fn dn(&self) -> &str { &self.dn }

    pub fn data(&self) -> &AttributeMap { &self.data }

    /// All values of an attribute; the name is matched case-insensitively.
    pub fn values(&self, attribute_name: &str) -> Option<&[String]> {
        self.data
            .get(&UniCase::new(attribute_name.to_owned()))
            .map(|values| values.as_slice())
    }

    pub fn first_value(&self, attribute_name: &str) -> Option<&str> {
        self.values(attribute_name)
            .and_then(|values| values.first())
            .map(|value| value.as_str())
    }
}


/// Ordered, append-only sequence of entries.
///
/// Indices never change once assigned; entries can be appended but neither
/// replaced nor removed.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct EntryCollection {
    entries: Vec<Entry>,
}
impl EntryCollection {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add<I: IntoIterator<Item = Entry>>(&mut self, entries: I) {
        self.entries.extend(entries);
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn contains_index(&self, index: usize) -> bool { index < self.entries.len() }

    pub fn get(&self, index: usize) -> Result<&Entry> {
        self.entries
            .get(index)
            .ok_or(LdapError::EntryNotFound(index))
    }

    pub fn first(&self) -> Option<&Entry> { self.entries.first() }

    /// Always fails; the collection is append-only.
    pub fn set(&mut self, _index: usize, _entry: Entry) -> Result<()> {
        Err(LdapError::UnsupportedMutation("EntryCollection::set"))
    }

    /// Always fails; the collection is append-only.
    pub fn remove(&mut self, _index: usize) -> Result<Entry> {
        Err(LdapError::UnsupportedMutation("EntryCollection::remove"))
    }

    pub fn iter(&self) -> slice::Iter<'_, Entry> { self.entries.iter() }

    pub fn as_slice(&self) -> &[Entry] { &self.entries }

    pub fn to_vec(&self) -> Vec<Entry> { self.entries.clone() }
}
impl From<Vec<Entry>> for EntryCollection {
    fn from(entries: Vec<Entry>) -> Self { Self { entries } }
}
impl FromIterator<Entry> for EntryCollection {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
impl IntoIterator for EntryCollection {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}
impl<'a> IntoIterator for &'a EntryCollection {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}
