use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

const CONFIG_TEMPLATE: &str = r#"# nf configuration
#
# The NewsAPI key is read from the NEWS_API_KEY environment variable.
# Any setting can also be overridden with NF_<SECTION>__<KEY>,
# e.g. NF_SEARCH__LANGUAGE=de.

# ── Search ───────────────────────────────────────────────────────

[search]
# api_key = "..."                 # or set NEWS_API_KEY env var
base_url = "https://newsapi.org/v2"
timeout_secs = 15
days_back = 7
language = "en"
max_articles = 10

# ── Extraction ───────────────────────────────────────────────────
# Pages are read with readability first, then a plain paragraph
# scrape with a browser user agent if that fails.

[extract]
max_chars = 5000
download_timeout_secs = 10
fallback_timeout_secs = 10
concurrency = 4

# ── Summaries ────────────────────────────────────────────────────

[summary]
max_length = 200
topic_articles = 5
sentence_boundary = '[.!?]\s+'
"#;

pub fn run() -> Result<()> {
    let config_dir = Config::config_dir()?;
    let config_path = config_dir.join("config.toml");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    if config_path.exists() {
        println!("Existing config file found:");
        println!("  {}", config_path.display());
        print!("\nOverwrite? (The existing file will be backed up) [y/N] ");

        // Flush stdout so the prompt appears before reading
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Setup cancelled.");
            return Ok(());
        }

        backup_file(&config_path)?;
    }

    write_template(&config_path)?;
    println!("Created {}", config_path.display());

    println!("\nNext steps:");
    println!("  1. Set your API key:  export NEWS_API_KEY=\"...\"");
    println!("  2. Search:            nf articles \"climate\"");
    println!("  3. Summarize a topic: nf summary \"climate\"");

    Ok(())
}

fn write_template(path: &Path) -> Result<()> {
    std::fs::write(path, CONFIG_TEMPLATE).with_context(|| format!("Failed to write {}", path.display()))
}

/// Back up a file to <name>.bak, appending a timestamp if .bak already exists.
fn backup_file(path: &Path) -> Result<()> {
    let mut backup = path.with_extension("toml.bak");

    if backup.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        backup = path.with_extension(format!("toml.bak.{}", timestamp));
    }

    std::fs::rename(path, &backup)
        .with_context(|| format!("Failed to back up {} to {}", path.display(), backup.display()))?;
    println!("  Backed up to {}", backup.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Toml};
    use figment::Figment;

    #[test]
    fn test_template_matches_defaults() {
        let config: Config = Figment::new()
            .merge(Toml::string(CONFIG_TEMPLATE))
            .extract()
            .unwrap();
        let defaults = Config::default();

        assert_eq!(config.news.search.base_url, defaults.news.search.base_url);
        assert_eq!(config.news.search.max_articles, defaults.news.search.max_articles);
        assert_eq!(config.news.extract.max_chars, defaults.news.extract.max_chars);
        assert_eq!(config.news.extract.concurrency, defaults.news.extract.concurrency);
        assert_eq!(config.news.summary.topic_articles, defaults.news.summary.topic_articles);
        assert_eq!(config.news.extract.user_agent, defaults.news.extract.user_agent);
        assert_eq!(config.news.summary.sentence_boundary, defaults.news.summary.sentence_boundary);
    }

    #[test]
    fn test_write_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        write_template(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        backup_file(&path).unwrap();
        assert!(!path.exists());
        assert!(dir.path().join("config.toml.bak").exists());

        write_template(&path).unwrap();
        backup_file(&path).unwrap();
        let backups = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(backups, 2);
    }
}
