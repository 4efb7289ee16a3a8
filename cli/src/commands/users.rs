//! disable-two-factor, set-password and set-superadmin.
//!
//! All user handling lives in the application's own user utility; this only
//! picks the mode and attaches the operator's terminal.

use std::io::Write;

use crate::app::runtime::Runtime;
use crate::deploy::orchestrator::{args, ExecInput};
use crate::deploy::services;
use crate::errors::CliError;

const USERS_UTILITY: &[&str] = &["node", "/home/app/unms/cli/users.js"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    DisableTwoFactor,
    SetPassword,
    SetSuperadmin,
}

impl UserAction {
    fn mode_flag(self) -> &'static str {
        match self {
            UserAction::DisableTwoFactor => "--disable-2fa",
            UserAction::SetPassword => "--set-password",
            UserAction::SetSuperadmin => "--set-superadmin",
        }
    }

    /// Utility arguments; without a username the utility lists users
    pub fn utility_args(self, username: Option<&str>) -> Vec<String> {
        let mut full = args(USERS_UTILITY.iter().copied());
        match username {
            Some(username) => full.extend(args([self.mode_flag(), "--username", username])),
            None => full.push("--list".to_string()),
        }
        full
    }
}

pub async fn user_action(
    rt: &mut Runtime<'_>,
    action: UserAction,
    username: Option<&str>,
) -> Result<(), CliError> {
    if username.is_none() {
        writeln!(rt.out, "No --username given. Existing users:")?;
    }
    rt.orchestrator
        .exec(services::APP, action.utility_args(username), ExecInput::Inherit)
        .await?;
    Ok(())
}
