use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};


#[derive(Clone, Debug, Eq, Hash, Ord, Parser, PartialEq, PartialOrd)]
#[command(group(ArgGroup::new("auth").required(true).args(["client_id", "credentials_file"])))]
pub struct Opts {
    /// TOML file with the server configuration.
    #[arg(short = 'f', long)]
    pub config: PathBuf,

    /// Client ID to bind as; the passcode is prompted for.
    #[arg(short = 'i', long)]
    pub client_id: Option<String>,

    /// TOML file containing `id` and `passcode`.
    #[arg(short = 'c', long)]
    pub credentials_file: Option<PathBuf>,

    /// Connect using ldaps://.
    #[arg(long)]
    pub tls: bool,

    /// Seconds to wait for the connection to be established.
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    #[command(subcommand)]
    pub mode: Mode,
}


#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Subcommand)]
pub enum Mode {
    /// Print the matching entries as LDIF.
    Search(SearchOpts),

    /// Find an entry and check whether it belongs to a group, directly or
    /// through nested groups.
    IsInGroup(MembershipOpts),
}


#[derive(Args, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SearchOpts {
    /// Only print the first matching entry.
    #[arg(long)]
    pub first: bool,

    /// Only look at the immediate children of the base.
    #[arg(long)]
    pub one_level: bool,

    /// Base DN; defaults to the server DN.
    #[arg(short = 'b', long)]
    pub context: Option<String>,

    /// Attribute to return; may be given multiple times. All attributes are
    /// returned if none is given.
    #[arg(short = 'a', long = "attribute")]
    pub attributes: Vec<String>,

    pub filter: String,
}


#[derive(Args, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MembershipOpts {
    /// Base DN to look for the entry in; defaults to the server DN.
    #[arg(short = 'b', long)]
    pub context: Option<String>,

    /// Filter selecting the entry; the first match is used.
    pub filter: String,

    pub group_name: String,
}
