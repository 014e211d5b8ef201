//! Fix-up pass: resolve absolute paths and content hashes of every `File`.
//!
//! This is the only part of the crate that touches the filesystem.

use crate::error::{Error, Result};
use crate::models::{Analysis, File, Hash};
use crate::visitor::VisitorMut;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Digest algorithms accepted by the fix-up pass.
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 6] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Name recorded in `Hash::alg`.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    fn hasher(self) -> Hasher {
        match self {
            HashAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            HashAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha224 => Hasher::Sha224(Sha224::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Hasher::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }

    /// Hex digest of everything `reader` yields.
    pub fn digest_reader<R: Read>(self, mut reader: R) -> std::io::Result<String> {
        let mut hasher = self.hasher();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finish())
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        HashAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name() == wanted)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

enum Hasher {
    Md5(md5::Context),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(ctx) => ctx.consume(data),
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha224(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha384(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    fn finish(self) -> String {
        match self {
            Hasher::Md5(ctx) => format!("{:x}", ctx.compute()),
            Hasher::Sha1(h) => hex::encode(h.finalize()),
            Hasher::Sha224(h) => hex::encode(h.finalize()),
            Hasher::Sha256(h) => hex::encode(h.finalize()),
            Hasher::Sha384(h) => hex::encode(h.finalize()),
            Hasher::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// Lexically normalise `path`: drop `.` segments and fold `..` into the
/// preceding segment. The filesystem is not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // ".." above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Visitor that rewrites `File` leaves; every other callback is a no-op.
pub struct FixupFiles<'a> {
    base_dir: Option<&'a Path>,
    hash_alg: Option<HashAlgorithm>,
}

impl<'a> FixupFiles<'a> {
    pub fn new(base_dir: Option<&'a Path>, hash_alg: Option<HashAlgorithm>) -> Self {
        FixupFiles { base_dir, hash_alg }
    }
}

impl VisitorMut for FixupFiles<'_> {
    fn visit_file(&mut self, file: &mut File) -> Result<()> {
        if let Some(base) = self.base_dir {
            let abspath = normalize(&base.join(&file.givenpath));
            file.abspath = Some(abspath.to_string_lossy().into_owned());
        }
        if let Some(alg) = self.hash_alg {
            let path = PathBuf::from(file.best_path());
            let handle = std::fs::File::open(&path).map_err(|e| Error::io(&path, e))?;
            let hexdigest = alg
                .digest_reader(handle)
                .map_err(|e| Error::io(&path, e))?;
            debug!(path = %path.display(), alg = alg.name(), "hashed file");
            file.hash = Some(Hash::new(alg.name(), hexdigest));
        }
        Ok(())
    }
}

impl Analysis {
    /// Return a copy of this analysis with file paths resolved against
    /// `base_dir` and, when `hash_alg` is given, content hashes filled in.
    pub fn fixup_files(&self, base_dir: Option<&Path>, hash_alg: Option<&str>) -> Result<Analysis> {
        let mut fixed = self.clone();
        fixed.fixup_files_in_place(base_dir, hash_alg)?;
        Ok(fixed)
    }

    /// In-place variant of [`Analysis::fixup_files`]. On error the document
    /// may be partially updated.
    pub fn fixup_files_in_place(
        &mut self,
        base_dir: Option<&Path>,
        hash_alg: Option<&str>,
    ) -> Result<()> {
        let alg = hash_alg.map(HashAlgorithm::from_str).transpose()?;
        debug!(base_dir = ?base_dir, alg = ?alg, "running file fix-up");
        self.accept_mut(&mut FixupFiles::new(base_dir, alg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Generator, Issue, Location, Message, Metadata, Point};
    use std::fs;
    use tempfile::tempdir;

    fn analysis_for(path: &str) -> Analysis {
        let issue = Issue::new(
            Location::new(File::new(path, None), None, Some(Point::new(1, 1))),
            Message::new("m"),
        );
        Analysis::new(
            Metadata::new(
                Generator::new("test", None),
                None,
                Some(File::new(path, None)),
                None,
            ),
            vec![issue.into()],
        )
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d.c")), PathBuf::from("/a/c/d.c"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("SHA1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert!(matches!(
            "crc32".parse::<HashAlgorithm>(),
            Err(Error::UnknownAlgorithm(name)) if name == "crc32"
        ));
    }

    #[test]
    fn test_known_digests() {
        let data: &[u8] = b"hello\n";
        assert_eq!(
            HashAlgorithm::Md5.digest_reader(data).unwrap(),
            "b1946ac92492d2347c6235b4d2611184"
        );
        assert_eq!(
            HashAlgorithm::Sha1.digest_reader(data).unwrap(),
            "f572d396fae9206628714fb2ce00f72e94f2258f"
        );
        assert_eq!(
            HashAlgorithm::Sha256.digest_reader(data).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn test_base_dir_sets_normalized_abspath() {
        let a = analysis_for("src/../foo.c");
        let fixed = a.fixup_files(Some(Path::new("/build/project")), None).unwrap();
        for f in fixed.files() {
            assert_eq!(f.abspath.as_deref(), Some("/build/project/foo.c"));
            assert!(f.hash.is_none());
        }
        // the input is untouched
        assert!(a.files().iter().all(|f| f.abspath.is_none()));
    }

    #[test]
    fn test_idempotent() {
        let a = analysis_for("foo.c");
        let base = Path::new("/build");
        let once = a.fixup_files(Some(base), None).unwrap();
        let twice = once.fixup_files(Some(base), None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_hashes_file_content() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("foo.c"), "hello\n").unwrap();
        let a = analysis_for("foo.c");
        let fixed = a.fixup_files(Some(dir.path()), Some("sha1")).unwrap();
        let files = fixed.files();
        assert_eq!(files.len(), 2);
        for f in files {
            let hash = f.hash.unwrap();
            assert_eq!(hash.alg, "sha1");
            assert_eq!(hash.hexdigest, "f572d396fae9206628714fb2ce00f72e94f2258f");
        }
    }

    #[test]
    fn test_hash_uses_givenpath_without_base_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foo.c");
        fs::write(&path, "hello\n").unwrap();
        let a = analysis_for(&path.to_string_lossy());
        let fixed = a.fixup_files(None, Some("md5")).unwrap();
        let f = fixed.metadata.file.unwrap();
        assert!(f.abspath.is_none());
        assert_eq!(f.hash.unwrap().hexdigest, "b1946ac92492d2347c6235b4d2611184");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let a = analysis_for("does-not-exist.c");
        match a.fixup_files(Some(dir.path()), Some("sha256")) {
            Err(Error::Io { path, .. }) => assert!(path.ends_with("does-not-exist.c")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_algorithm_rejected_before_walk() {
        let a = analysis_for("does-not-exist.c");
        assert!(matches!(
            a.fixup_files(None, Some("whirlpool")),
            Err(Error::UnknownAlgorithm(_))
        ));
    }
}
