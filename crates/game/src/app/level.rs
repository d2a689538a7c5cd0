use std::fs;
use std::path::Path;

use engine::LevelDoc;

/// Schema preflight for a level file. [`engine::TileMap::load_level`] reports
/// malformed documents, but without the JSON path that failed; running the
/// deserializer through `serde_path_to_error` first turns "malformed level
/// document" into "tiles.4;10.variant: invalid type".
///
/// A missing file is fine: the editor starts from a blank map and saves it
/// later.
pub(crate) fn preflight(path: &Path) -> Result<(), String> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(format!("failed to read {}: {error}", path.display())),
    };

    let mut deserializer = serde_json::Deserializer::from_str(&text);
    let result: Result<LevelDoc, _> = serde_path_to_error::deserialize(&mut deserializer);
    match result {
        Ok(_) => Ok(()),
        Err(error) => Err(format!(
            "{}: {} at {}",
            path.display(),
            error.inner(),
            error.path()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_passes_preflight() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(preflight(&dir.path().join("nope.json")).is_ok());
    }

    #[test]
    fn valid_document_passes_preflight() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("level_0.json");
        fs::write(
            &path,
            r#"{"tiles": {"0;10": {"tile_type": "Dirt", "variant": 1}}}"#,
        )
        .expect("write");
        assert!(preflight(&path).is_ok());
    }

    #[test]
    fn schema_error_reports_the_failing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("level_0.json");
        fs::write(
            &path,
            r#"{"tiles": {"0;10": {"tile_type": "Dirt", "variant": "nine"}}}"#,
        )
        .expect("write");
        let message = preflight(&path).expect_err("must fail");
        assert!(message.contains("tiles.0;10.variant"), "{message}");
    }

    #[test]
    fn non_json_text_fails_preflight() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("level_0.json");
        fs::write(&path, "not json").expect("write");
        assert!(preflight(&path).is_err());
    }
}
