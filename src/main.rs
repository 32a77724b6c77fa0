mod args;


use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use ldapconnector::ldap::LdapConnection;
use ldapconnector::ldif::{write_entries, write_entry, ByteWriteAdapter};
use ldapconnector::{ClientCredentials, Ldap3Transport, LdapConfiguration, LdapConnector, LdapError};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::{MembershipOpts, Mode, Opts, SearchOpts};


fn output_error(e: std::fmt::Error) -> LdapError {
    LdapError::Io(io::Error::new(io::ErrorKind::Other, e))
}


fn obtain_credentials(opts: &Opts) -> Result<ClientCredentials, LdapError> {
    if let Some(client_id) = &opts.client_id {
        let passcode = rpassword::prompt_password("LDAP passcode: ")?;
        Ok(ClientCredentials::new(client_id.clone(), passcode))
    } else if let Some(credentials_file) = &opts.credentials_file {
        ClientCredentials::load(credentials_file)
    } else {
        unreachable!();
    }
}


async fn search(connector: &mut LdapConnector<LdapConnection>, opts: &SearchOpts) -> Result<ExitCode, LdapError> {
    let attributes: Vec<&str> = opts.attributes
        .iter()
        .map(|a| a.as_str())
        .collect();
    let context = opts.context.as_deref();

    if opts.first {
        let Some(entry) = connector.search_first(&opts.filter, opts.one_level, context, &attributes).await?
            else { return Ok(ExitCode::from(1)) };
        let mut stdout = io::stdout().lock();
        write_entry(&mut ByteWriteAdapter(&mut stdout), &entry)
            .map_err(output_error)?;
        stdout.flush()?;
    } else {
        let entries = connector.search(&opts.filter, opts.one_level, context, &attributes).await?;
        info!(count = entries.len(), "search finished");
        let mut stdout = io::stdout().lock();
        write_entries(&mut ByteWriteAdapter(&mut stdout), &entries)
            .map_err(output_error)?;
        stdout.flush()?;
    }
    Ok(ExitCode::SUCCESS)
}


async fn is_in_group(connector: &mut LdapConnector<LdapConnection>, opts: &MembershipOpts) -> Result<ExitCode, LdapError> {
    let Some(entry) = connector.search_first(&opts.filter, false, opts.context.as_deref(), &["dn"]).await? else {
        eprintln!("no entry matches {}", opts.filter);
        return Ok(ExitCode::from(2));
    };
    if connector.is_in_group(&entry, &opts.group_name).await? {
        println!("{} is a member of {}", entry.dn(), opts.group_name);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} is not a member of {}", entry.dn(), opts.group_name);
        Ok(ExitCode::from(1))
    }
}


async fn run(opts: Opts) -> Result<ExitCode, LdapError> {
    let configuration = LdapConfiguration::load(&opts.config)?;
    let credentials = obtain_credentials(&opts)?;

    let mut transport = Ldap3Transport::new()
        .with_tls(opts.tls);
    if let Some(seconds) = opts.connect_timeout {
        transport = transport.with_connect_timeout(Duration::from_secs(seconds));
    }

    let mut connector = LdapConnector::open(&transport, configuration).await?;
    connector.authenticate(&credentials).await?;

    let result = match &opts.mode {
        Mode::Search(search_opts) => search(&mut connector, search_opts).await,
        Mode::IsInGroup(membership_opts) => is_in_group(&mut connector, membership_opts).await,
    };
    connector.close().await;
    result
}


#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts = Opts::parse();
    match run(opts).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(3)
        },
    }
}
