//! Module resolution and loading implementations.
//!
//! Scripts import ordinary modules through an [`oxc_resolver`] resolver running over a
//! [`FileSystem`]. `hosttypes/...` specifiers never reach it unless binding them failed.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

pub use oxc_resolver::{FileMetadata, FileSystem, ResolveError};
use phf::Map;

/// A read-only file system over modules compiled into the binary.
///
/// Paths are looked up in a compile-time perfect hash map, so nothing touches the disk.
/// Directories exist implicitly: any prefix of an embedded path ending at a `/` is one.
/// Scripts can only import the modules listed here, plus whatever host types the engine
/// exposes.
///
/// ```no_run
/// use hostbridge_js::embed_modules;
///
/// let fs = embed_modules! {
///     "math.js" => "../tests/fixtures/math.js",
///     "game/index.js" => "../tests/fixtures/game/index.js",
/// };
/// ```
#[derive(Clone, Copy)]
pub struct FileSystemEmbedded {
    modules: &'static Map<&'static str, &'static str>,
}

impl FileSystemEmbedded {
    /// Wrap a module map. [`embed_modules!`](crate::embed_modules) builds the map for you.
    pub const fn new(modules: &'static Map<&'static str, &'static str>) -> Self {
        Self { modules }
    }

    fn source(&self, path: &Path) -> io::Result<&'static str> {
        let key = normalize(path)?;
        self.modules
            .get(&*key)
            .copied()
            .ok_or_else(|| not_found(format!("Module '{key}' not found")))
    }

    fn is_directory(&self, key: &str) -> bool {
        if key.is_empty() {
            return !self.modules.is_empty();
        }
        self.modules
            .keys()
            .any(|module| module.strip_prefix(key).is_some_and(|rest| rest.starts_with('/')))
    }
}

/// Embedded keys have no leading `./` or `/` and always use `/` separators.
fn normalize(path: &Path) -> io::Result<Cow<'_, str>> {
    let path = path
        .to_str()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid UTF-8 in path"))?;

    if !path.contains('\\') && !path.starts_with("./") && !path.starts_with('/') {
        return Ok(Cow::Borrowed(path));
    }
    let path = path.replace('\\', "/");
    Ok(Cow::Owned(
        path.trim_start_matches("./").trim_start_matches('/').to_string(),
    ))
}

fn not_found(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, message)
}

impl FileSystem for FileSystemEmbedded {
    fn new() -> Self {
        unreachable!("FileSystemEmbedded is created with embed_modules!");
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.source(path).map(|source| source.as_bytes().to_vec())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.source(path).map(str::to_string)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let key = normalize(path)?;
        let is_file = self.modules.contains_key(&*key);
        let is_dir = self.is_directory(&key);
        if !is_file && !is_dir {
            return Err(not_found(format!("Path '{key}' not found")));
        }
        Ok(FileMetadata::new(is_file, is_dir, false))
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        self.metadata(path)
    }

    fn read_link(&self, _path: &Path) -> Result<PathBuf, ResolveError> {
        let err = io::Error::new(
            io::ErrorKind::InvalidInput,
            "Embedded modules cannot be symlinks",
        );
        Err(err.into())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        normalize(path).map(|key| PathBuf::from(key.into_owned()))
    }
}

/// Build a [`FileSystemEmbedded`] from `"module path" => "file"` pairs.
///
/// Files are read with `include_str!`, so they are relative to the invoking source file.
/// With `@inline` the right-hand side is the module source itself.
///
/// ```no_run
/// use hostbridge_js::{EngineBuilder, embed_modules};
///
/// let fs = embed_modules! {
///     "math.js" => "../tests/fixtures/math.js",
///     "game/index.js" => "../tests/fixtures/game/index.js",
/// };
///
/// let engine = EngineBuilder::new()
///     .with_module_loader(fs)
///     .build()
///     .unwrap();
///
/// let inline = embed_modules! {
///     "greeting.js" => @inline "export const greeting = 'hello';",
/// };
/// ```
#[macro_export]
macro_rules! embed_modules {
    ($($key:expr => $file:expr),* $(,)?) => {{
        use $crate::FileSystemEmbedded;
        use ::phf::{phf_map, Map};

        static EMBEDDED_MODULES: Map<&'static str, &'static str> = phf_map! {
            $(
                $key => include_str!($file),
            )*
        };

        FileSystemEmbedded::new(&EMBEDDED_MODULES)
    }};

    ($($key:expr => @inline $content:expr),* $(,)?) => {{
        use $crate::FileSystemEmbedded;
        use ::phf::{phf_map, Map};

        static EMBEDDED_MODULES: Map<&'static str, &'static str> = phf_map! {
            $(
                $key => $content,
            )*
        };

        FileSystemEmbedded::new(&EMBEDDED_MODULES)
    }};
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_read_module() {
        let fs = embed_modules! {
            "game/rules.js" => @inline "export const maxPartySize = 4;",
        };

        for path in ["game/rules.js", "./game/rules.js", "/game/rules.js", "game\\rules.js"] {
            assert_eq!(
                fs.read_to_string(Path::new(path)).unwrap(),
                "export const maxPartySize = 4;"
            );
        }
        assert_eq!(
            fs.read(Path::new("game/rules.js")).unwrap(),
            b"export const maxPartySize = 4;"
        );
    }

    #[test]
    fn test_metadata() {
        let fs = embed_modules! {
            "game/rules.js" => @inline "content",
        };

        let dir = fs.metadata(Path::new("game")).unwrap();
        assert!(dir.is_dir() && !dir.is_file());

        let file = fs.metadata(Path::new("game/rules.js")).unwrap();
        assert!(file.is_file() && !file.is_dir());

        assert!(fs.metadata(Path::new("")).unwrap().is_dir());
    }

    #[test]
    fn test_prefix_is_not_a_directory() {
        let fs = embed_modules! {
            "game.js" => @inline "content1",
            "gameplay.js" => @inline "content2",
        };

        assert!(fs.metadata(Path::new("game")).is_err());
        assert!(fs.metadata(Path::new("game.js")).unwrap().is_file());
    }

    #[test]
    fn test_host_type_paths_are_plain_files() {
        let fs = embed_modules! {
            "hosttypes/legacy/Thing.js" => @inline "export const legacy = true;",
        };

        assert!(fs.metadata(Path::new("hosttypes/legacy")).unwrap().is_dir());
        assert!(fs.metadata(Path::new("/hosttypes/legacy/Thing.js")).unwrap().is_file());
        assert!(fs.metadata(Path::new("hosttypes/game")).is_err());
    }

    #[test]
    fn test_missing_module() {
        let fs = embed_modules! {
            "exists.js" => @inline "content",
        };

        let err = fs.read_to_string(Path::new("missing.js")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(fs.read_link(Path::new("exists.js")).is_err());
    }
}
