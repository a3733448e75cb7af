//! Structure-file helpers shared by the PDB request handlers.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// A structure file reported by [`list_structures`].
#[derive(Debug, Clone, Serialize)]
pub struct StructureFile {
    pub name: String,
    pub path: String,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub modified: f64,
}

/// Resolve a request path: absolute paths pass through unchanged, relative
/// paths are taken against the current working directory. Every
/// file-touching handler uses this same rule.
pub fn resolve_path(path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(p))
            .unwrap_or_else(|_| p.to_path_buf())
    }
}

/// Object name a loaded structure carries: base name, extension stripped.
pub fn object_name(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// True when the file name carries a structure extension (case-insensitive).
pub fn is_structure_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".pdb") || lower.ends_with(".cif")
}

pub fn read_structure(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

pub fn write_structure(path: &Path, content: &str) -> io::Result<()> {
    fs::write(path, content)
}

/// Enumerate the `.pdb`/`.cif` entries of a directory.
pub fn list_structures(dir: &Path) -> io::Result<Vec<StructureFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_structure_file(&name) {
            continue;
        }
        let metadata = entry.metadata()?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        files.push(StructureFile {
            name,
            path: entry.path().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified,
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "pymol-mcp-test-{}-{}",
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resolve_absolute_path_passes_through() {
        let abs = std::env::temp_dir().join("x.pdb");
        assert_eq!(resolve_path(abs.to_str().unwrap()), abs);
    }

    #[test]
    fn test_resolve_relative_path_joins_cwd() {
        let resolved = resolve_path("structures/x.pdb");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("structures/x.pdb"));
    }

    #[test]
    fn test_object_name_strips_dir_and_extension() {
        assert_eq!(object_name("models/1abc.pdb"), "1abc");
        assert_eq!(object_name("1abc.cif"), "1abc");
    }

    #[test]
    fn test_structure_extensions_case_insensitive() {
        assert!(is_structure_file("a.pdb"));
        assert!(is_structure_file("b.CIF"));
        assert!(is_structure_file("c.Pdb"));
        assert!(!is_structure_file("notes.txt"));
        assert!(!is_structure_file("pdb"));
    }

    #[test]
    fn test_list_structures_filters_and_describes() {
        let dir = temp_dir();
        fs::write(dir.join("a.pdb"), "ATOM").unwrap();
        fs::write(dir.join("b.cif"), "data_b").unwrap();
        fs::write(dir.join("c.txt"), "notes").unwrap();

        let files = list_structures(&dir).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.pdb");
        assert_eq!(files[1].name, "b.cif");
        for f in &files {
            assert!(f.size > 0);
            assert!(f.modified > 0.0);
            assert!(f.path.ends_with(&f.name));
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_list_structures_missing_directory() {
        assert!(list_structures(Path::new("/nonexistent/structures")).is_err());
    }
}
