use std::path::Path;

use anyhow::Result;
use tpl_config::Config;

use crate::cli::ConfigCommands;

pub fn handle(cmd: ConfigCommands, config: &Config, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommands::Path => match explicit {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", Config::config_path().display()),
        },
    }

    Ok(())
}
