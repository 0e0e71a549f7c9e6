//! Table file formats.

use std::path::Path;
use tablefsm_core::{CoreError, JsonCodec, TableCodec, TableDescription};

/// YAML codec. Mappings keep their document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl TableCodec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn decode(&self, text: &str) -> Result<TableDescription, CoreError> {
        serde_yaml::from_str(text).map_err(|e| CoreError::Codec {
            codec: self.name(),
            reason: e.to_string(),
        })
    }

    fn encode(&self, description: &TableDescription) -> Result<String, CoreError> {
        serde_yaml::to_string(description).map_err(|e| CoreError::Codec {
            codec: self.name(),
            reason: e.to_string(),
        })
    }
}

/// Picks a codec by file extension: `.yaml`/`.yml` read as YAML, anything
/// else as JSON.
pub fn codec_for_path(path: &Path, pretty: bool) -> Box<dyn TableCodec> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);
    if is_yaml {
        Box::new(YamlCodec)
    } else {
        Box::new(JsonCodec { pretty })
    }
}

/// Reads and decodes a table file.
pub fn read_table(path: &Path) -> Result<TableDescription, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read table '{}': {}", path.display(), e))?;
    let description = codec_for_path(path, false).decode(&text)?;
    tracing::debug!(
        "read {} entries from {}",
        description.len(),
        path.display()
    );
    Ok(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_YAML: &str = "\
Created-Continue: Stopped
Created-Cancel: InternalErrorState
Stopped-Run: Running
Running-Cancel: Cancelled
";

    #[test]
    fn test_yaml_decode_keeps_order() {
        let desc = YamlCodec.decode(JOB_YAML).unwrap();
        let keys: Vec<&str> = desc.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "Created-Continue",
                "Created-Cancel",
                "Stopped-Run",
                "Running-Cancel"
            ]
        );
        assert_eq!(desc.get("Stopped-Run"), Some("Running"));
    }

    #[test]
    fn test_yaml_encode() {
        let desc = YamlCodec.decode(JOB_YAML).unwrap();
        assert_eq!(YamlCodec.encode(&desc).unwrap(), JOB_YAML);
    }

    #[test]
    fn test_yaml_decode_error() {
        let err = YamlCodec.decode("- just\n- a list\n").unwrap_err();
        assert!(matches!(err, CoreError::Codec { codec: "yaml", .. }));
    }

    #[test]
    fn test_codec_for_path() {
        assert_eq!(codec_for_path(Path::new("job.yaml"), false).name(), "yaml");
        assert_eq!(codec_for_path(Path::new("job.YML"), false).name(), "yaml");
        assert_eq!(codec_for_path(Path::new("job.json"), false).name(), "json");
        assert_eq!(codec_for_path(Path::new("job"), true).name(), "json");
    }

    #[test]
    fn test_read_table() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("job.yml");
        std::fs::write(&yaml, JOB_YAML).unwrap();
        let json = dir.path().join("job.json");
        std::fs::write(&json, r#"{"A-Go":"B"}"#).unwrap();

        assert_eq!(read_table(&yaml).unwrap().len(), 4);
        assert_eq!(read_table(&json).unwrap().get("A-Go"), Some("B"));
        assert!(read_table(&dir.path().join("missing.json")).is_err());
    }
}
