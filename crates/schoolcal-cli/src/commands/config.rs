//! Configuration commands.

use std::path::Path;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &CliConfig, path: &Path) -> CliResult<()> {
    println!("{}", render_dump(config, path)?);
    Ok(())
}

/// The `config dump` text: a header naming the file, then the TOML.
pub fn render_dump(config: &CliConfig, path: &Path) -> CliResult<String> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    Ok(format!("# config.toml ({})\n{}", path.display(), toml_str))
}

/// Validate the configuration.
pub fn validate(config: &CliConfig) -> CliResult<()> {
    config.validate()?;
    println!(
        "Configuration is valid (timezone {}, week starts {:?}).",
        config.calendar.timezone, config.calendar.week_start
    );
    Ok(())
}

/// Show the configuration file path in effect.
pub fn path(path: &Path) -> CliResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_names_the_file_in_use() {
        let custom = Path::new("/srv/school/calendar.toml");
        let text = render_dump(&CliConfig::default(), custom).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "# config.toml (/srv/school/calendar.toml)");
        assert!(text.contains("[calendar]"));
    }
}
