use std::path::{Path, PathBuf};

/// Extensions tried when the requested file is missing.
const AUDIO_EXTENSIONS: &[&str] = &[".wav", ".ogg", ".mp3", ".flac"];

/// Looks up a named sound resource on disk.
pub trait ResourceResolver {
    /// Return the path of `name`, or `None` if it can't be found.
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

impl<F> ResourceResolver for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self(name)
    }
}

/// Resolves names against an ordered list of asset directories.
#[derive(Debug, Clone, Default)]
pub struct DirectoryResolver {
    roots: Vec<PathBuf>,
}

impl DirectoryResolver {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Append another directory to search after the existing ones.
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ResourceResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        self.roots.iter().find_map(|root| resolve_in(root, name))
    }
}

/// Find `name` under `base`: exact match, lowercase name, then the same stem
/// with another audio extension.
fn resolve_in(base: &Path, name: &str) -> Option<PathBuf> {
    let original = base.join(name);
    if original.is_file() {
        return Some(original);
    }

    let lower = name.to_lowercase();
    if lower != name {
        let lower_path = base.join(&lower);
        if lower_path.is_file() {
            return Some(lower_path);
        }
    }

    let (stem, original_ext) = match name.rfind('.') {
        Some(idx) => (&name[..idx], Some(&name[idx..])),
        None => (name, None),
    };

    for &ext in AUDIO_EXTENSIONS {
        if original_ext.is_some_and(|e| e.eq_ignore_ascii_case(ext)) {
            continue;
        }
        let candidate = base.join(format!("{stem}{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_exact_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("theme.mp3"), b"").unwrap();

        let resolver = DirectoryResolver::new([dir.path()]);
        assert_eq!(
            resolver.resolve("theme.mp3"),
            Some(dir.path().join("theme.mp3"))
        );
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempdir().unwrap();
        let resolver = DirectoryResolver::new([dir.path()]);
        assert!(resolver.resolve("nonexistent.wav").is_none());
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn falls_back_to_lowercase_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("rain.ogg"), b"").unwrap();

        let resolver = DirectoryResolver::new([dir.path()]);
        let found = resolver.resolve("RAIN.ogg").unwrap();
        assert_eq!(found.file_name().unwrap().to_string_lossy().to_lowercase(), "rain.ogg");
    }

    #[test]
    fn falls_back_to_other_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("door.ogg"), b"").unwrap();

        let resolver = DirectoryResolver::new([dir.path()]);
        assert_eq!(resolver.resolve("door.wav"), Some(dir.path().join("door.ogg")));
    }

    #[test]
    fn earlier_root_wins() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("click.wav"), b"").unwrap();
        fs::write(second.path().join("click.wav"), b"").unwrap();

        let resolver = DirectoryResolver::new([first.path()]).with_root(second.path());
        assert_eq!(resolver.roots().len(), 2);
        assert_eq!(resolver.resolve("click.wav"), Some(first.path().join("click.wav")));
    }

    #[test]
    fn directories_are_not_resources() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("music.mp3")).unwrap();

        let resolver = DirectoryResolver::new([dir.path()]);
        assert!(resolver.resolve("music.mp3").is_none());
    }

    #[test]
    fn closures_resolve() {
        let resolver = |name: &str| Some(PathBuf::from("/bundle").join(name));
        assert_eq!(
            resolver.resolve("a.wav"),
            Some(PathBuf::from("/bundle/a.wav"))
        );
    }
}
