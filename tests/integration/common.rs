use dupfind::duplicates::{DetectionMode, DuplicateFinder, DuplicateGroup, FinderConfig, ScanSummary};
use dupfind::scanner::{DigestAlgorithm, Walker, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Serialize tests that read or write `DUPFIND_*` variables, and clear them.
pub fn env_guard() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    for (key, _) in std::env::vars() {
        if key.starts_with("DUPFIND_") {
            std::env::remove_var(key);
        }
    }
    guard
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Enumerate every file under `roots` with default walker settings.
pub fn walk(roots: &[&Path]) -> Vec<PathBuf> {
    let roots = roots.iter().map(|p| p.to_path_buf()).collect();
    Walker::new(roots, WalkerConfig::default())
        .walk()
        .map(Result::unwrap)
        .collect()
}

/// Walk `root` and run the finder in `mode`.
pub fn scan(root: &Path, mode: DetectionMode) -> (Vec<DuplicateGroup>, ScanSummary) {
    let finder = DuplicateFinder::new(FinderConfig::default().with_mode(mode));
    finder.find_duplicates(walk(&[root])).unwrap()
}

pub fn sha256() -> DetectionMode {
    DetectionMode::Hash(DigestAlgorithm::Sha256)
}

/// Member paths relative to `root`, with `/` separators.
pub fn rel_paths(group: &DuplicateGroup, root: &Path) -> Vec<String> {
    let root = root.canonicalize().unwrap();
    group
        .members
        .iter()
        .map(|f| {
            f.path
                .strip_prefix(&root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}
