use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes data atomically through a temporary sibling file plus rename.
/// 以臨時檔案搭配 rename 實現原子寫入。
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

// Appends to the full file name rather than swapping the extension, so
// "a.md" and "a.txt" in one directory never share a temporary file.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_creates_missing_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/note.md");
        write_atomic(&path, b"hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn sibling_keeps_the_extension_distinct() {
        assert_eq!(
            tmp_sibling(Path::new("/n/a.md")),
            PathBuf::from("/n/a.md.tmp")
        );
        assert_eq!(
            tmp_sibling(Path::new("/n/a.txt")),
            PathBuf::from("/n/a.txt.tmp")
        );
    }
}
