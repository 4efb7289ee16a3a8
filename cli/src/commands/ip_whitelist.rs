//! ip-whitelist

use std::fmt;
use std::io::Write;
use std::net::IpAddr;

use ipnet::IpNet;

use crate::app::runtime::Runtime;
use crate::config::descriptor::Descriptor;
use crate::config::keys;
use crate::config::mirror::{write_mirrored, MirroredSetting};
use crate::deploy::orchestrator::{args, ExecInput};
use crate::deploy::services;
use crate::errors::CliError;

/// Whitelist helper inside the reverse proxy; its view is authoritative
pub const WHITELIST_SCRIPT: &str = "/ip-whitelist.sh";

/// Non-empty list of addresses or networks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpWhitelist(Vec<String>);

impl IpWhitelist {
    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for IpWhitelist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Comma-separated IP addresses or CIDR networks
pub fn parse_whitelist(raw: &str) -> Result<IpWhitelist, String> {
    let mut entries = Vec::new();
    for entry in raw.split(',').map(str::trim) {
        if entry.is_empty() {
            return Err("empty address in list".to_string());
        }
        if entry.parse::<IpAddr>().is_err() && entry.parse::<IpNet>().is_err() {
            return Err(format!("'{}' is not an IP address or network", entry));
        }
        entries.push(entry.to_string());
    }
    Ok(IpWhitelist(entries))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhitelistAction {
    Show,
    Clear,
    Set(IpWhitelist),
}

/// Apply the action to the live proxy and the persisted settings, then print
/// the proxy's effective whitelist. An empty result means any address is
/// allowed.
pub async fn ip_whitelist(
    rt: &mut Runtime<'_>,
    action: WhitelistAction,
) -> Result<Vec<String>, CliError> {
    let persisted = match &action {
        WhitelistAction::Show => None,
        WhitelistAction::Clear => Some(String::new()),
        WhitelistAction::Set(list) => Some(list.to_string()),
    };

    if let Some(value) = &persisted {
        Descriptor::new(rt.ctx.descriptor_file())
            .ensure_key(keys::IP_WHITELIST)
            .await?;

        let live_args = if value.is_empty() {
            args([WHITELIST_SCRIPT, "--clear"])
        } else {
            args([WHITELIST_SCRIPT, "--set", value.as_str()])
        };
        rt.orchestrator
            .exec(services::PROXY, live_args, ExecInput::None)
            .await?;

        write_mirrored(
            rt.ctx,
            rt.database,
            &MirroredSetting::files(keys::IP_WHITELIST, value.clone()),
        )
        .await?;
    }

    let shown = rt
        .orchestrator
        .exec(services::PROXY, args([WHITELIST_SCRIPT, "--show"]), ExecInput::None)
        .await?;
    let effective: Vec<String> = shown
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if effective.is_empty() {
        writeln!(rt.out, "IP whitelist is empty: any address allowed.")?;
    } else {
        writeln!(rt.out, "Allowed addresses:")?;
        for entry in &effective {
            writeln!(rt.out, "  {}", entry)?;
        }
    }
    Ok(effective)
}
