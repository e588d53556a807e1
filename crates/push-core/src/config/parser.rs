//! TOML parser with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::PushConfig;

/// Parse a push configuration file with detailed error messages
pub fn parse_push_toml(path: &Path) -> Result<PushConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_push_toml_str(&content)
        .with_context(|| format!("Could not load config file: {}", path.display()))
}

/// Parse push configuration content from a string
pub fn parse_push_toml_str(content: &str) -> Result<PushConfig> {
    let config: PushConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Enhance TOML parsing errors with the offending lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let prefix = content.get(..span.start).unwrap_or(content);
            let line_num = (prefix.matches('\n').count() + 1).min(content.lines().count().max(1));
            let context = get_line_context(content, line_num);
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                context,
                message
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_pushrc() {
        let config = parse_push_toml_str(
            r#"
host_user = "www"
host_path = "/srv/www"
clone_path = "web/site"
skip_tests = true

[tools]
tar = "/opt/gnu/bin/tar"

[build]
copy = ["bin", "lib"]

[deploy]
purge = ["lib/python"]

[hooks.test]
before = ["prove -r t"]
"#,
        )
        .unwrap();

        assert_eq!(config.host_user.as_deref(), Some("www"));
        assert_eq!(config.skip_tests, Some(true));
        assert_eq!(config.build.copy, Some(vec!["bin".into(), "lib".into()]));
        assert_eq!(config.hooks["test"].before, vec!["prove -r t".to_string()]);
        assert!(config.hooks["test"].after.is_empty());
        assert_eq!(
            config.tools["tar"],
            std::path::PathBuf::from("/opt/gnu/bin/tar")
        );
    }

    #[test]
    fn error_points_at_line() {
        let err = parse_push_toml_str("host_user = \"www\"\nhost_path = \n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains(">>>"), "{msg}");
    }

    #[test]
    fn rejects_hooks_for_unknown_tasks() {
        let err = parse_push_toml_str("[hooks.deplyo]\nbefore = [\"true\"]\n").unwrap_err();
        assert!(err.to_string().contains("deplyo"));
    }

    #[test]
    fn rejects_relative_host_path() {
        assert!(parse_push_toml_str("host_path = \"srv/data\"\n").is_err());
    }

    #[test]
    fn rejects_escaping_purge_entries() {
        assert!(parse_push_toml_str("[deploy]\npurge = [\"../etc\"]\n").is_err());
        assert!(parse_push_toml_str("[deploy]\npurge = [\"/etc\"]\n").is_err());
        assert!(parse_push_toml_str("[deploy]\npurge = [\"venv\"]\n").is_ok());
    }
}
