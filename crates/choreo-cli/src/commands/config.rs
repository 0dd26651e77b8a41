use anyhow::Result;

use choreo_core::{ChoreoConfig, SiteContent};

pub fn run(config: &ChoreoConfig, save: bool) -> Result<()> {
    print!("{}", config.to_toml()?);
    if save {
        config.save()?;
        eprintln!("Saved to {}", ChoreoConfig::config_path().display());
    }
    Ok(())
}

pub fn print_content(content: &SiteContent) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(content)?);
    Ok(())
}
