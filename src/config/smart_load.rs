use figment::providers::{Data, Format, Json, Toml, Yaml};
use std::path::Path;
use tracing::debug;

/// Provider for a config file whose format is taken from its extension,
/// or sniffed from its content when the extension is not recognised.
pub fn auto<P: AsRef<Path>>(path: P) -> impl figment::Provider {
    let path = path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    match extension.to_lowercase().as_str() {
        "toml" => ConfigFile::Toml(Toml::file(path)),
        "json" => ConfigFile::Json(Json::file(path)),
        "yaml" | "yml" => ConfigFile::Yaml(Yaml::file(path)),
        _ => {
            let detected = std::fs::read_to_string(path)
                .ok()
                .and_then(|content| detect_format(&content));
            debug!("Config {} detected as {:?}", path.display(), detected);
            match detected {
                Some(ConfigFormat::Json) => ConfigFile::Json(Json::file(path)),
                Some(ConfigFormat::Yaml) => ConfigFile::Yaml(Yaml::file(path)),
                Some(ConfigFormat::Toml) | None => ConfigFile::Toml(Toml::file(path)),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

enum ConfigFile {
    Toml(Data<Toml>),
    Json(Data<Json>),
    Yaml(Data<Yaml>),
}

impl figment::Provider for ConfigFile {
    fn metadata(&self) -> figment::Metadata {
        match self {
            ConfigFile::Toml(p) => p.metadata(),
            ConfigFile::Json(p) => p.metadata(),
            ConfigFile::Yaml(p) => p.metadata(),
        }
    }

    fn data(&self) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        match self {
            ConfigFile::Toml(p) => p.data(),
            ConfigFile::Json(p) => p.data(),
            ConfigFile::Yaml(p) => p.data(),
        }
    }
}

fn detect_format(content: &str) -> Option<ConfigFormat> {
    let trimmed = content.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(ConfigFormat::Json);
    }

    let lines = || {
        trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
    };

    // TOML wins when there is a [table] header or a bare key = value line
    let looks_like_toml = lines().any(|line| {
        (line.starts_with('[') && line.ends_with(']'))
            || line.split_once('=').is_some_and(|(key, _)| !key.contains(':'))
    });
    if looks_like_toml {
        return Some(ConfigFormat::Toml);
    }

    if trimmed.starts_with("---") || lines().any(|line| line.contains(':')) {
        return Some(ConfigFormat::Yaml);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format(r#"{"logs": {"directory": "/x"}}"#), Some(ConfigFormat::Json));
        assert_eq!(detect_format("logs:\n  directory: /x\n"), Some(ConfigFormat::Yaml));
        assert_eq!(detect_format("[logs]\ndirectory = \"/x\""), Some(ConfigFormat::Toml));
        assert_eq!(detect_format("# comment\nkey = 1"), Some(ConfigFormat::Toml));
        assert_eq!(detect_format("nothing useful"), None);
    }

    #[test]
    fn test_toml_with_colons_in_values_is_still_toml() {
        let content = "[email]\nfrom = \"ops@example.com\"\nsendmail = \"C:/mail\"\n";
        assert_eq!(detect_format(content), Some(ConfigFormat::Toml));
    }

    #[test]
    fn test_unknown_extension_is_sniffed() {
        use figment::Figment;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("monitor.conf");
        std::fs::write(&path, "search:\n  context_lines: 9\n").unwrap();

        let figment = Figment::new().merge(auto(&path));
        let lines: usize = figment.extract_inner("search.context_lines").unwrap();
        assert_eq!(lines, 9);
    }
}
