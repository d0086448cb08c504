use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file system rooted at `/mock` unless told otherwise
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
    failing_removals: AtomicUsize,
    removal_attempts: AtomicUsize,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            files: RwLock::new(BTreeMap::new()),
            root: root.clone(),
            failing_removals: AtomicUsize::new(0),
            removal_attempts: AtomicUsize::new(0),
        };
        fs.add_dir(&root);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.write();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.write();
        Self::ensure_parents(&mut files, &path);
    }

    /// Make the next `count` calls to `remove_dir_all` fail
    pub fn fail_next_removals(&self, count: usize) {
        self.failing_removals.store(count, Ordering::SeqCst);
    }

    pub fn removal_attempts(&self) -> usize {
        self.removal_attempts.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.read().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.read()
            .get(&path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.read()
            .get(&path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let files = self.read();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let files = self.read();

        if !files.contains_key(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        let entries = files
            .iter()
            .filter(|(file_path, _)| file_path.parent() == Some(path.as_path()))
            .map(|(file_path, entry)| DirEntry {
                path: file_path.clone(),
                name: file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string(),
                file_type: entry.file_type,
            })
            .collect();

        Ok(entries)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.removal_attempts.fetch_add(1, Ordering::SeqCst);

        let pending = self.failing_removals.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_removals.store(pending - 1, Ordering::SeqCst);
            return Err(anyhow!("Directory is in use: {:?}", path));
        }

        let path = self.normalize_path(path);
        let mut files = self.write();
        if !files.contains_key(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        files.retain(|p, _| !p.starts_with(&path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let fs = MockFileSystem::new();
        fs.add_file("a/b/file.txt", "content");

        assert!(fs.is_dir(Path::new("/mock/a")));
        assert!(fs.is_dir(Path::new("/mock/a/b")));
        assert!(fs.is_file(Path::new("/mock/a/b/file.txt")));
    }

    #[test]
    fn test_read_to_string() {
        let fs = MockFileSystem::new();
        fs.add_file("version.json", "{}");

        assert_eq!(fs.read_to_string(Path::new("version.json")).unwrap(), "{}");
        assert!(fs.read_to_string(Path::new("missing.json")).is_err());
    }

    #[test]
    fn test_read_dir_lists_direct_children() {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_file("Cargo.toml", "[package]");
        fs.add_file("src/main.rs", "fn main() {}");

        let entries = fs.read_dir(Path::new("/repo")).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();
        assert_eq!(names, vec!["Cargo.toml", "src"]);
    }

    #[test]
    fn test_remove_dir_all() {
        let fs = MockFileSystem::new();
        fs.add_file("Artifacts/app.zip", "zip");

        fs.remove_dir_all(Path::new("Artifacts")).unwrap();
        assert!(!fs.exists(Path::new("Artifacts")));
        assert!(!fs.exists(Path::new("Artifacts/app.zip")));
    }

    #[test]
    fn test_fail_next_removals() {
        let fs = MockFileSystem::new();
        fs.add_dir("Artifacts");
        fs.fail_next_removals(2);

        assert!(fs.remove_dir_all(Path::new("Artifacts")).is_err());
        assert!(fs.remove_dir_all(Path::new("Artifacts")).is_err());
        assert!(fs.remove_dir_all(Path::new("Artifacts")).is_ok());
        assert_eq!(fs.removal_attempts(), 3);
    }
}
