//! Small filesystem helpers shared by the copy-based composers.

use std::io;
use std::path::Path;

/// Recursively copy `src` into `dst`, merging over existing content.
/// Symlinks are recreated, not followed.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else if file_type.is_symlink() {
            let link = std::fs::read_link(&from)?;
            if to.is_symlink() || to.exists() {
                std::fs::remove_file(&to)?;
            }
            std::os::unix::fs::symlink(link, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn copies_nested_trees() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        fs::create_dir_all(src.path().join("etc/apt/sources.list.d")).unwrap();
        fs::write(src.path().join("etc/apt/sources.list"), "deb x\n").unwrap();
        fs::write(
            src.path().join("etc/apt/sources.list.d/extra.list"),
            "deb y\n",
        )
        .unwrap();
        std::os::unix::fs::symlink("sources.list", src.path().join("etc/apt/link")).unwrap();

        copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dst.path().join("etc/apt/sources.list")).unwrap(),
            "deb x\n"
        );
        assert_eq!(
            fs::read_to_string(dst.path().join("etc/apt/sources.list.d/extra.list")).unwrap(),
            "deb y\n"
        );
        assert!(dst.path().join("etc/apt/link").is_symlink());
    }

    #[test]
    fn merges_over_existing_content() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();

        fs::write(src.path().join("a"), "new").unwrap();
        fs::write(dst.path().join("a"), "old").unwrap();
        fs::write(dst.path().join("keep"), "kept").unwrap();

        copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(fs::read_to_string(dst.path().join("a")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dst.path().join("keep")).unwrap(), "kept");
    }
}
