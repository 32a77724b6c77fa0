use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, ResultEntry, SearchEntry};
use tracing::{debug, warn};

use crate::directory::{
    Diagnostic, DirectoryHandle, HandleDiagnostics, LdapOption, OptionValue, SearchScope, Transport,
};


// negative codes are client-side, as in OpenLDAP
const CODE_SERVER_DOWN: i32 = -1;
const CODE_TIMEOUT: i32 = -5;


/// Opens connections using `ldap3`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Ldap3Transport {
    use_tls: bool,
    connect_timeout: Option<Duration>,
}
impl Ldap3Transport {
    pub fn new() -> Self { Self::default() }

    /// Use `ldaps://` instead of `ldap://`.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    fn url(&self, host: &str, port: u16) -> String {
        let scheme = if self.use_tls { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, host, port)
    }
}
#[async_trait]
impl Transport for Ldap3Transport {
    type Handle = LdapConnection;

    async fn connect(&self, host: &str, port: u16) -> Result<LdapConnection, Diagnostic> {
        let url = self.url(host, port);
        let mut settings = LdapConnSettings::new();
        if let Some(connect_timeout) = self.connect_timeout {
            settings = settings.set_conn_timeout(connect_timeout);
        }

        debug!(%url, "connecting");
        let (conn, ldap) = match LdapConnAsync::with_settings(settings, &url).await {
            Ok(cl) => cl,
            Err(e) => return Err(diagnostic_from_error(&e)),
        };
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection driver error: {}", e);
            }
        });
        Ok(LdapConnection::new(ldap))
    }
}


/// An open `ldap3` connection.
#[derive(Debug)]
pub struct LdapConnection {
    ldap: Ldap,
    last_error: Diagnostic,
    options: BTreeMap<LdapOption, OptionValue>,
    operation_timeout: Option<Duration>,
    closed: bool,
}
impl LdapConnection {
    pub fn new(ldap: Ldap) -> Self {
        Self {
            ldap,
            last_error: Diagnostic::new(0, result_code_description(0), ""),
            options: BTreeMap::new(),
            operation_timeout: None,
            closed: false,
        }
    }

    pub fn option(&self, option: LdapOption) -> Option<&OptionValue> {
        self.options.get(&option)
    }

    fn apply_timeout(&mut self) {
        if let Some(timeout) = self.operation_timeout {
            self.ldap.with_timeout(timeout);
        }
    }

    fn record<T>(&mut self, result: ldap3::result::Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = Diagnostic::new(0, result_code_description(0), "");
                Some(value)
            },
            Err(e) => {
                self.last_error = diagnostic_from_error(&e);
                None
            },
        }
    }
}
impl HandleDiagnostics for LdapConnection {
    fn is_valid(&self) -> bool { !self.closed }

    fn last_error(&self) -> Diagnostic { self.last_error.clone() }
}
#[async_trait]
impl DirectoryHandle for LdapConnection {
    type RawResult = Vec<ResultEntry>;

    fn set_option(&mut self, option: LdapOption, value: &OptionValue) {
        match option {
            LdapOption::ProtocolVersion => {
                if value.as_integer() != Some(3) {
                    warn!("ldap3 only speaks protocol version 3; ignoring requested version {}", value);
                }
            },
            LdapOption::Referrals => {
                if value.as_integer() != Some(0) {
                    warn!("ldap3 does not chase referrals; ignoring referral setting {}", value);
                }
            },
            LdapOption::NetworkTimeout => {
                match value.as_integer() {
                    Some(seconds) if seconds > 0 => {
                        self.operation_timeout = Some(Duration::from_secs(seconds as u64));
                    },
                    _ => {
                        self.operation_timeout = None;
                    },
                }
            },
            LdapOption::Other(id) => {
                debug!(option = id, %value, "option has no effect on ldap3 connections");
            },
        }
        self.options.insert(option, value.clone());
    }

    async fn bind(&mut self, identity: &str, passcode: &str) -> bool {
        debug!(identity, "binding");
        self.apply_timeout();
        let result = self.ldap.simple_bind(identity, passcode).await
            .and_then(|lr| lr.success());
        self.record(result).is_some()
    }

    async fn search(&mut self, scope: SearchScope, base_dn: &str, filter: &str, attributes: &[&str]) -> Option<Vec<ResultEntry>> {
        debug!(?scope, base_dn, filter, "searching");
        self.apply_timeout();
        let result = self.ldap.search(base_dn, scope.to_ldap3(), filter, attributes.to_vec()).await
            .and_then(|sr| sr.success());
        self.record(result)
            .map(|(entries, _)| entries)
    }

    fn get_entries(&mut self, raw_result: Vec<ResultEntry>) -> Vec<SearchEntry> {
        raw_result
            .into_iter()
            .map(SearchEntry::construct)
            .collect()
    }

    async fn release(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.ldap.unbind().await {
            warn!("failed to unbind cleanly: {}", e);
        }
        self.closed = true;
    }
}


fn diagnostic_from_error(error: &ldap3::LdapError) -> Diagnostic {
    match error {
        ldap3::LdapError::LdapResult { result } => {
            let code = result.rc as i32;
            Diagnostic::new(code, result_code_description(code), result.text.clone())
        },
        ldap3::LdapError::Timeout { .. } => {
            Diagnostic::new(CODE_TIMEOUT, result_code_description(CODE_TIMEOUT), error.to_string())
        },
        other => {
            Diagnostic::new(CODE_SERVER_DOWN, result_code_description(CODE_SERVER_DOWN), other.to_string())
        },
    }
}


/// Short descriptions of LDAP result codes (RFC4511 section 4.1.9), worded
/// like OpenLDAP's `ldap_err2string`.
pub fn result_code_description(code: i32) -> &'static str {
    match code {
        0 => "Success",
        1 => "Operations error",
        2 => "Protocol error",
        3 => "Time limit exceeded",
        4 => "Size limit exceeded",
        5 => "Compare False",
        6 => "Compare True",
        7 => "Authentication method not supported",
        8 => "Strong(er) authentication required",
        10 => "Referral",
        11 => "Administrative limit exceeded",
        12 => "Critical extension is unavailable",
        13 => "Confidentiality required",
        14 => "SASL bind in progress",
        16 => "No such attribute",
        17 => "Undefined attribute type",
        18 => "Inappropriate matching",
        19 => "Constraint violation",
        20 => "Type or value exists",
        21 => "Invalid syntax",
        32 => "No such object",
        33 => "Alias problem",
        34 => "Invalid DN syntax",
        36 => "Alias dereferencing problem",
        48 => "Inappropriate authentication",
        49 => "Invalid credentials",
        50 => "Insufficient access",
        51 => "Server is busy",
        52 => "Server is unavailable",
        53 => "Server is unwilling to perform",
        54 => "Loop detected",
        64 => "Naming violation",
        65 => "Object class violation",
        66 => "Operation not allowed on non-leaf",
        67 => "Operation not allowed on RDN",
        68 => "Already exists",
        69 => "Cannot modify object class",
        71 => "Results too large",
        80 => "Other (e.g., implementation specific) error",
        CODE_SERVER_DOWN => "Can't contact LDAP server",
        -2 => "Local error",
        -3 => "Encoding error",
        -4 => "Decoding error",
        CODE_TIMEOUT => "Timed out",
        -7 => "Bad search filter",
        _ => "Unknown error",
    }
}
