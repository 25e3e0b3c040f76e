//! configure command - manage connection profiles

use super::CommandContext;
use crate::config::{Profile, DEFAULT_PROFILE};
use crate::ConfigureAction;
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

pub fn execute(ctx: &CommandContext, action: Option<ConfigureAction>) -> Result<()> {
    let profile = ctx.profile_name.as_deref();
    match action {
        Some(ConfigureAction::Set { key, value }) => set_config(profile, &key, &value),
        Some(ConfigureAction::Get { key }) => get_config(profile, &key),
        Some(ConfigureAction::List) => list_config(profile),
        Some(ConfigureAction::RemoveProfile { name }) => remove_profile(&name),
        None => interactive_configure(profile),
    }
}

fn set_config(profile: Option<&str>, key: &str, value: &str) -> Result<()> {
    let path = Profile::config_path()?;
    let mut config = Profile::load_from(&path, profile)?;
    config.set_value(key, value)?;
    config.save_to(&path, profile)?;
    println!("Set {} = {}", key.cyan(), value);
    Ok(())
}

fn get_config(profile: Option<&str>, key: &str) -> Result<()> {
    let config = Profile::load(profile)?;
    match config.get_value(key) {
        Some(value) => println!("{}", value),
        None => println!("(not set)"),
    }
    Ok(())
}

fn list_config(profile: Option<&str>) -> Result<()> {
    let config = Profile::load(profile)?;

    println!(
        "{} [{}]",
        "Current configuration".bold(),
        profile.unwrap_or(DEFAULT_PROFILE)
    );
    for key in Profile::keys() {
        let value = config
            .get_value(key)
            .unwrap_or_else(|| "(not set)".to_string());
        println!("  {}: {}", key.cyan(), value);
    }

    println!();
    println!("{}", "Available profiles:".bold());
    let profiles = Profile::list_profiles()?;
    if profiles.is_empty() {
        println!("  (none)");
    } else {
        for name in profiles {
            println!("  - {}", name);
        }
    }

    println!();
    println!(
        "Config file: {}",
        Profile::config_path()?.display().to_string().dimmed()
    );

    Ok(())
}

fn remove_profile(name: &str) -> Result<()> {
    if Profile::delete_profile(name)? {
        println!("Removed profile: {}", name.red());
    } else {
        println!("No profile named {}", name);
    }
    Ok(())
}

/// Prompt for a value; an empty answer keeps `current`
fn prompt(label: &str, current: &str) -> Result<Option<String>> {
    print!("{} [{}]: ", label, current);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let input = input.trim();
    Ok(if input.is_empty() {
        None
    } else {
        Some(input.to_string())
    })
}

fn interactive_configure(profile: Option<&str>) -> Result<()> {
    println!("{}", "s3shift Configuration".bold());
    println!("Press Enter to keep current value. Leave keys unset to use the AWS provider chain.\n");

    let path = Profile::config_path()?;
    let mut config = Profile::load_from(&path, profile)?;

    if let Some(endpoint) = prompt("Endpoint URL", config.endpoint.as_deref().unwrap_or(""))? {
        config.endpoint = Some(endpoint);
    }
    if let Some(access_key) = prompt("Access Key", config.access_key.as_deref().unwrap_or(""))? {
        config.access_key = Some(access_key);
    }
    let masked = if config.secret_key.is_some() { "***" } else { "" };
    if let Some(secret_key) = prompt("Secret Key", masked)? {
        config.secret_key = Some(secret_key);
    }
    if let Some(region) = prompt("Region", &config.region)? {
        config.region = region;
    }
    if let Some(path_style) = prompt("Path style", &config.path_style.to_string())? {
        config.set_value("path_style", &path_style)?;
    }

    config.save_to(&path, profile)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        "✓".green(),
        path.display()
    );

    Ok(())
}
