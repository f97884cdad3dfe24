//! Config command: shows where the configuration comes from and what it
//! resolves to.

use anyhow::{Context, Result};
use structwrite_core::Config;

use crate::config_resolver::ConfigSource;

/// Runs the config command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let config = super::check::load_config(source)?;
    config.validate().context("Invalid configuration")?;

    match source.path() {
        Some(p) => println!("# source: {}", p.display()),
        None => println!("# source: built-in defaults"),
    }
    print!("{}", render(&config)?);
    Ok(())
}

fn render(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to render configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_parses_back() {
        let mut config = Config::default();
        config.structwrite.structs = vec!["example.com/app/model.Account".into()];
        config.structwrite.constructor_marker = Some("structwrite:constructor".into());

        let text = render(&config).unwrap();
        assert!(text.contains("[structwrite]"));

        let parsed = Config::parse(&text).unwrap();
        assert_eq!(parsed.structwrite.structs, config.structwrite.structs);
        assert_eq!(
            parsed.structwrite.constructor_marker.as_deref(),
            Some("structwrite:constructor")
        );
        assert_eq!(parsed.analyzer.exclude, vec!["**/vendor/**".to_string()]);
    }
}
