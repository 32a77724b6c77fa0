//! Scripted in-memory transport for tests.


use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ldap3::SearchEntry;

use crate::directory::{
    Diagnostic, DirectoryHandle, HandleDiagnostics, LdapOption, OptionValue, SearchScope, Transport,
};


#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedSearch {
    pub scope: SearchScope,
    pub base_dn: String,
    pub filter: String,
    pub attributes: Vec<String>,
}


#[derive(Debug, Default)]
struct MockState {
    results: HashMap<(SearchScope, String, String), Vec<SearchEntry>>,
    failing_filters: HashSet<String>,
    accepted_credentials: Option<(String, String)>,
    searches: Vec<RecordedSearch>,
    options: Vec<(LdapOption, OptionValue)>,
    binds: Vec<String>,
    released: bool,
}


/// The directory contents shared between a transport and the handles it hands out.
#[derive(Clone, Debug, Default)]
pub struct MockDirectory {
    state: Arc<Mutex<MockState>>,
}
impl MockDirectory {
    pub fn new() -> Self { Self::default() }

    pub fn with_result(self, scope: SearchScope, base_dn: &str, filter: &str, entries: Vec<SearchEntry>) -> Self {
        self.state.lock().unwrap().results.insert(
            (scope, base_dn.to_owned(), filter.to_owned()),
            entries,
        );
        self
    }

    pub fn with_failure(self, filter: &str) -> Self {
        self.state.lock().unwrap().failing_filters.insert(filter.to_owned());
        self
    }

    pub fn accepting(self, identity: &str, passcode: &str) -> Self {
        self.state.lock().unwrap().accepted_credentials = Some((identity.to_owned(), passcode.to_owned()));
        self
    }

    pub fn searches(&self) -> Vec<RecordedSearch> { self.state.lock().unwrap().searches.clone() }

    pub fn options(&self) -> Vec<(LdapOption, OptionValue)> { self.state.lock().unwrap().options.clone() }

    pub fn binds(&self) -> Vec<String> { self.state.lock().unwrap().binds.clone() }

    pub fn released(&self) -> bool { self.state.lock().unwrap().released }

    pub fn transport(&self) -> MockTransport {
        MockTransport {
            directory: self.clone(),
            reachable: true,
        }
    }

    pub fn unreachable_transport(&self) -> MockTransport {
        MockTransport {
            directory: self.clone(),
            reachable: false,
        }
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            directory: self.clone(),
            last_error: Diagnostic::new(0, "Success", ""),
            valid: true,
        }
    }
}


#[derive(Clone, Debug)]
pub struct MockTransport {
    directory: MockDirectory,
    reachable: bool,
}
#[async_trait]
impl Transport for MockTransport {
    type Handle = MockHandle;

    async fn connect(&self, host: &str, _port: u16) -> Result<MockHandle, Diagnostic> {
        if !self.reachable {
            return Err(Diagnostic::new(-1, "Can't contact LDAP server", format!("{} is unreachable", host)));
        }
        Ok(self.directory.handle())
    }
}


#[derive(Debug)]
pub struct MockHandle {
    directory: MockDirectory,
    last_error: Diagnostic,
    valid: bool,
}
impl MockHandle {
    pub fn invalidate(&mut self) { self.valid = false; }
}
impl HandleDiagnostics for MockHandle {
    fn is_valid(&self) -> bool { self.valid }

    fn last_error(&self) -> Diagnostic { self.last_error.clone() }
}
#[async_trait]
impl DirectoryHandle for MockHandle {
    type RawResult = Vec<SearchEntry>;

    fn set_option(&mut self, option: LdapOption, value: &OptionValue) {
        self.directory.state.lock().unwrap().options.push((option, value.clone()));
    }

    async fn bind(&mut self, identity: &str, passcode: &str) -> bool {
        let mut state = self.directory.state.lock().unwrap();
        state.binds.push(identity.to_owned());
        let accepted = match &state.accepted_credentials {
            Some((i, p)) => i == identity && p == passcode,
            None => false,
        };
        if !accepted {
            self.last_error = Diagnostic::new(49, "Invalid credentials", "AcceptSecurityContext error, data 52e");
        }
        accepted
    }

    async fn search(&mut self, scope: SearchScope, base_dn: &str, filter: &str, attributes: &[&str]) -> Option<Vec<SearchEntry>> {
        let mut state = self.directory.state.lock().unwrap();
        state.searches.push(RecordedSearch {
            scope,
            base_dn: base_dn.to_owned(),
            filter: filter.to_owned(),
            attributes: attributes.iter().map(|a| (*a).to_owned()).collect(),
        });
        if state.failing_filters.contains(filter) {
            self.last_error = Diagnostic::new(32, "No such object", "0000208D: NameErr: DSID-03100241");
            return None;
        }
        let entries = state.results
            .get(&(scope, base_dn.to_owned(), filter.to_owned()))
            .cloned()
            .unwrap_or_default();
        Some(entries)
    }

    fn get_entries(&mut self, raw_result: Vec<SearchEntry>) -> Vec<SearchEntry> {
        raw_result
    }

    async fn release(&mut self) {
        self.directory.state.lock().unwrap().released = true;
        self.valid = false;
    }
}


pub fn search_entry(dn: &str, attributes: Vec<(&str, Vec<&str>)>) -> SearchEntry {
    let mut attrs = HashMap::new();
    for (name, values) in attributes {
        attrs.insert(
            name.to_owned(),
            values.into_iter().map(|v| v.to_owned()).collect(),
        );
    }
    SearchEntry {
        dn: dn.to_owned(),
        attrs,
        bin_attrs: HashMap::new(),
    }
}
