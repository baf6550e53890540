//! Profile configuration commands.

use serde_json::json;

use crate::cli::ConfigCommands;
use crate::commands::common::CliContext;
use crate::config::{normalize_text_option, ProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, ctx: &CliContext) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            owner,
            db_path,
            sync_url,
            sync_token,
            no_activate,
        } => run_init(
            profile.as_deref(),
            owner,
            db_path,
            sync_url,
            sync_token,
            no_activate,
        ),
        ConfigCommands::Show => run_show(ctx),
    }
}

fn run_init(
    profile: Option<&str>,
    owner: Option<String>,
    db_path: Option<String>,
    sync_url: Option<String>,
    sync_token: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = ProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile);

    {
        let entry = config.profile_mut_or_default(&profile_name);
        if let Some(owner) = normalize_text_option(owner) {
            entry.owner_id = Some(owner);
        }
        if let Some(db_path) = normalize_text_option(db_path) {
            entry.db_path = Some(db_path);
        }
        if let Some(url) = normalize_text_option(sync_url) {
            entry.sync_url = Some(url);
        }
        if let Some(token) = normalize_text_option(sync_token) {
            entry.sync_auth_token = Some(token);
        }
    }

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!("Profile '{profile_name}' saved to {}", path.display());
    Ok(())
}

fn run_show(ctx: &CliContext) -> Result<(), CliError> {
    let report = json!({
        "owner": ctx.owner,
        "db_path": ctx.db_path.display().to_string(),
        "sync_configured": ctx.sync.is_some(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
