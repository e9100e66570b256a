//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, FileFormat};
use crate::error::Result;
use crate::output::OutputWriter;
use tracing::info;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    if args.path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            args.path.display()
        ))?;
        return Ok(());
    }

    Config::starter().save(&args.path)?;
    info!(path = %args.path.display(), "Wrote starter configuration");

    output.success(&format!("✓ Created config at {}", args.path.display()))?;
    output.info("Edit it to describe your resource types and relationships.")?;
    Ok(())
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let format = match args.format {
        ConfigFormat::Toml => FileFormat::Toml,
        ConfigFormat::Json => FileFormat::Json,
        ConfigFormat::Yaml => FileFormat::Yaml,
    };

    let content = config.render(format)?;
    output.writeln(content.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Human, false, true, 0, Box::new(std::io::sink()))
    }

    #[test]
    fn test_init_writes_starter_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(".jsonapi-spec.toml");

        handle_config_init(ConfigInitArgs { path: path.clone(), force: false }, &mut quiet_output()).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), Config::starter());
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".jsonapi-spec.yaml");
        fs::write(&path, "resources: {}\n").unwrap();

        handle_config_init(ConfigInitArgs { path: path.clone(), force: false }, &mut quiet_output()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "resources: {}\n");

        handle_config_init(ConfigInitArgs { path: path.clone(), force: true }, &mut quiet_output()).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::starter());
    }
}
