//! Author attribution from the folder layout.
//!
//! The input tree is organized one folder per author:
//!
//! ```text
//! input-images/
//! ├── alice/
//! │   ├── p1.jpg        → author "alice"
//! │   └── trip/
//! │       └── p2.jpg    → author "trip"  (immediate parent, see below)
//! └── loose.jpg         → no author, skipped
//! ```
//!
//! The author is the name of the file's **immediate** parent folder. A file
//! sitting directly in the input root has no author and must not be
//! attributed to the root folder's own name.
//!
//! Nested folders are a known sharp edge: a file two levels below the root is
//! attributed to the innermost folder, not to the top-level author folder.
//! This is the literal rule and is kept as-is; keep author folders one level
//! deep.

use std::path::Path;

/// Resolve the author of `file` relative to `input_root`.
///
/// Returns `None` when the file sits directly in `input_root`, or when the
/// parent folder has no usable name.
pub fn resolve_author(file: &Path, input_root: &Path) -> Option<String> {
    let parent = file.parent()?;
    if parent == input_root {
        return None;
    }
    parent
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_from_subfolder() {
        let root = Path::new("/data/input-images");
        let file = root.join("author_name").join("image.jpg");
        assert_eq!(resolve_author(&file, root).as_deref(), Some("author_name"));
    }

    #[test]
    fn no_author_in_root() {
        let root = Path::new("/data/input-images");
        let file = root.join("image.jpg");
        assert_eq!(resolve_author(&file, root), None);
    }

    #[test]
    fn root_name_is_never_the_author() {
        let root = Path::new("/data/alice");
        assert_eq!(resolve_author(&root.join("p1.jpg"), root), None);
    }

    #[test]
    fn nested_folder_resolves_to_innermost_name() {
        // Known sharp edge: the innermost folder wins, not the author folder.
        let root = Path::new("/data/input-images");
        let file = root.join("test_author").join("subfolder").join("image.jpg");
        assert_eq!(resolve_author(&file, root).as_deref(), Some("subfolder"));
    }

    #[test]
    fn relative_paths_work() {
        let root = Path::new("input-images");
        let file = Path::new("input-images/bob/p2.png");
        assert_eq!(resolve_author(file, root).as_deref(), Some("bob"));
    }

    #[test]
    fn author_keeps_raw_folder_name() {
        let root = Path::new("input-images");
        let file = root.join("Jane Doe!").join("p.jpg");
        assert_eq!(resolve_author(&file, root).as_deref(), Some("Jane Doe!"));
    }
}
