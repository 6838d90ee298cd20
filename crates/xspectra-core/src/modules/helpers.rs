use crate::domain::{XsError, XsResult};
use std::fs;
use std::path::Path;

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> XsResult<()> {
    fs::write(path, normalize_text_artifact(content))
        .map_err(|source| XsError::filesystem(path, source))
}

pub fn create_dir_tree(path: &Path) -> XsResult<()> {
    fs::create_dir_all(path).map_err(|source| XsError::filesystem(path, source))
}

/// Copies one asset file. A missing source is the recoverable `MissingAsset`
/// condition; every other I/O failure is fatal.
pub fn copy_asset(source: &Path, destination: &Path) -> XsResult<()> {
    match fs::copy(source, destination) {
        Ok(_) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Err(XsError::missing_asset(
                source.to_string_lossy(),
                "asset file does not exist",
            ))
        }
        Err(error) => Err(XsError::filesystem(destination, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::{copy_asset, normalize_text_artifact, write_text_artifact};
    use crate::domain::XsError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn normalize_uses_canonical_line_endings_and_trailing_newline() {
        assert_eq!(normalize_text_artifact("a\r\nb\rc"), "a\nb\nc\n");
        assert_eq!(normalize_text_artifact("done\n"), "done\n");
        assert_eq!(normalize_text_artifact(""), "");
    }

    #[test]
    fn repeated_writes_produce_identical_bytes() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("deck.in");

        write_text_artifact(&path, "&control\n/").expect("first write should succeed");
        let first = fs::read(&path).expect("artifact should be readable");
        write_text_artifact(&path, "&control\n/").expect("second write should succeed");
        let second = fs::read(&path).expect("artifact should be readable");

        assert_eq!(first, second);
        assert_eq!(second, b"&control\n/\n");
    }

    #[test]
    fn missing_copy_source_degrades_to_missing_asset() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = copy_asset(&temp.path().join("absent.upf"), &temp.path().join("out.upf"))
            .expect_err("copy should fail");
        assert!(matches!(error, XsError::MissingAsset { .. }));
        assert!(error.is_recoverable());
    }

    #[test]
    fn copy_asset_moves_content_verbatim() {
        let temp = TempDir::new().expect("tempdir should be created");
        let source = temp.path().join("Ti.upf");
        let destination = temp.path().join("copied/Ti.upf");
        fs::create_dir_all(destination.parent().expect("parent should exist"))
            .expect("directory should be created");
        fs::write(&source, "pseudopotential body").expect("source should be written");

        copy_asset(&source, &destination).expect("copy should succeed");
        assert_eq!(
            fs::read_to_string(&destination).expect("copy should be readable"),
            "pseudopotential body"
        );
    }
}
