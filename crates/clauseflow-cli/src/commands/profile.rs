//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, Profile};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the profile command.
///
/// Actions that change the configuration save it before reporting.
pub fn execute_profile(args: ProfileArgs, config: &mut Config, formatter: &Formatter) -> Result<()> {
    let message = match args.action {
        ProfileAction::List => return print(formatter.format_profiles(config)?),
        ProfileAction::Show => {
            let profile = config.get_active_profile()?;
            return print(formatter.format_profile(&config.active_profile, profile)?);
        }
        ProfileAction::Switch { name } => {
            config.switch_profile(name.clone())?;
            formatter.success(&format!("Switched to profile '{}'", name))
        }
        ProfileAction::Set {
            name,
            provider,
            model,
            endpoint,
            api_key_env,
        } => {
            let profile = Profile {
                provider: provider.into(),
                model,
                endpoint,
                api_key_env,
            };
            let verb = if upsert(config, &name, profile) { "Created" } else { "Updated" };
            formatter.success(&format!("{} profile '{}'", verb, name))
        }
        ProfileAction::Delete { name } => {
            if !remove(config, &name)? {
                return print(formatter.warning(&format!("Profile '{}' does not exist", name)));
            }
            formatter.success(&format!("Deleted profile '{}'", name))
        }
    };

    config.save()?;
    print(message)
}

fn print(text: String) -> Result<()> {
    println!("{}", text);
    Ok(())
}

/// Insert or replace `name`; true when it is new.
fn upsert(config: &mut Config, name: &str, profile: Profile) -> bool {
    let created = !config.profiles.contains_key(name);
    config.set_profile(name.to_string(), profile);
    created
}

/// Remove `name`; the active profile cannot be removed.
fn remove(config: &mut Config, name: &str) -> Result<bool> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }
    Ok(config.profiles.remove(name).is_some())
}
