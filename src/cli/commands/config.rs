//! Config command handler

use crate::args::ConfigSubcommand;
use nu_planner::config::Config;
use std::io::{self, BufRead, Write};

/// Dispatch config subcommands
pub fn run(
    subcommand: Option<ConfigSubcommand>,
    config: &mut Config,
    defaults: &Config,
) -> Result<(), String> {
    match subcommand {
        None | Some(ConfigSubcommand::Get { key: None }) => {
            println!("\n=== Configuration ===\n");
            print!("{config}");
            println!("\n# file: {}", Config::get_config_file_path().display());
            Ok(())
        }
        Some(ConfigSubcommand::Get { key: Some(key) }) => {
            let value = config
                .get(&key)
                .ok_or_else(|| format!("✗ Unknown config key: '{key}'"))?;
            println!("{value}");
            Ok(())
        }
        Some(ConfigSubcommand::Set { key, value }) => {
            config.set(&key, &value).map_err(|e| format!("✗ {e}"))?;
            persist(config)?;
            println!("✓ Set {key} = {value}");
            Ok(())
        }
        Some(ConfigSubcommand::Unset { key }) => {
            config.unset(&key, defaults).map_err(|e| format!("✗ {e}"))?;
            persist(config)?;
            println!("✓ Reset {key} to default");
            Ok(())
        }
        Some(ConfigSubcommand::Reset) => reset(&mut io::stdin().lock()),
    }
}

fn persist(config: &Config) -> Result<(), String> {
    config
        .save()
        .map_err(|e| format!("✗ Failed to save config: {e}"))
}

fn reset(input: &mut impl BufRead) -> Result<(), String> {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return Ok(());
    }

    print!("Reset config to defaults? (y/n): ");
    io::stdout().flush().ok();
    let mut response = String::new();
    input.read_line(&mut response).ok();

    if confirmed(&response) {
        Config::reset().map_err(|e| format!("✗ Failed to remove config file: {e}"))?;
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
    Ok(())
}

fn confirmed(response: &str) -> bool {
    matches!(response.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_answers() {
        assert!(confirmed("y\n"));
        assert!(confirmed(" YES "));
        assert!(!confirmed("n"));
        assert!(!confirmed(""));
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let mut config = Config::from_defaults();
        let defaults = Config::from_defaults();
        let result = run(
            Some(ConfigSubcommand::Get {
                key: Some("nope".to_string()),
            }),
            &mut config,
            &defaults,
        );
        assert_eq!(result, Err("✗ Unknown config key: 'nope'".to_string()));
    }
}
