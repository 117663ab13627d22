//! Config command implementation.

use anyhow::{Result, bail};

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, quiet: bool) -> Result<()> {
    let path = Config::path();
    match action {
        ConfigAction::Show => {
            let config = Config::load();
            let content = toml::to_string_pretty(&config)?;
            if content.trim().is_empty() {
                println!("# No configuration set ({})", path.display());
            } else {
                print!("{}", content);
            }
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            if path.exists() {
                bail!(
                    "Config file already exists: {}\nUse 'farmwatch config set' to change values.",
                    path.display()
                );
            }
            Config::initial().save()?;
            if !quiet {
                println!("Created {}", path.display());
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            config.set(key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {:?} = {}", key, value.trim());
            }
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load();
            config.unset(key);
            config.save()?;
            if !quiet {
                println!("Unset {:?}", key);
            }
        }
    }
    Ok(())
}
