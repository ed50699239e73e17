//! Writing planned artifacts to disk.
//!
//! # Per-descriptor steps
//!
//! 1. Stop with [`GenerationError::Cancelled`] if the cancel flag is set.
//! 2. With `force_writable_check`, refuse an existing read-only target.
//! 3. With `backup_existing`, rename an existing target to
//!    `{file_name}.{YYYYmmdd-HHMMSS}.bak` (`-1`, `-2`, ... when taken).
//! 4. Ask the generator for the content and write it atomically.
//!
//! The first failure stops the run. Everything recorded for earlier
//! descriptors stays in the [`GenerationResult`]; the failing descriptor
//! contributes nothing, because a backup taken for it is moved back. Only a
//! backup that cannot be moved back is reported, since the file did move.

#![allow(clippy::module_name_repetitions)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::GenerationOptions;
use crate::error::{BoxError, GenerationError};
use crate::plan::{ArtifactDescriptor, Plan};

/// File-system primitives the writer needs.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    /// Whether an existing file refuses writes.
    ///
    /// # Errors
    ///
    /// Returns the error from reading the file's metadata.
    fn is_read_only(&self, path: &Path) -> io::Result<bool>;

    /// # Errors
    ///
    /// Returns the underlying rename error.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns the underlying error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Replace the content of `path` with `contents`. Readers never observe
    /// a partially written file.
    ///
    /// The file may be replaced rather than modified in place, so hard links
    /// to the old file keep the old content. An existing target's
    /// permissions carry over, read-only included: the writable check is the
    /// only thing that refuses read-only targets.
    ///
    /// # Errors
    ///
    /// Returns the underlying write or rename error.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_read_only(&self, path: &Path) -> io::Result<bool> {
        (**self).is_read_only(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write(path, contents)
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_read_only(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.permissions().readonly())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "target has no file name")
        })?;
        let mut tmp_name = std::ffi::OsString::from(".");
        tmp_name.push(file_name);
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        // The rename swaps in a new inode; give it the old file's mode.
        let permissions = fs::metadata(path).ok().map(|meta| meta.permissions());
        let replaced = fs::write(&tmp, contents)
            .and_then(|()| permissions.map_or(Ok(()), |perms| fs::set_permissions(&tmp, perms)))
            .and_then(|()| fs::rename(&tmp, path));
        if let Err(err) = replaced {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        Ok(())
    }
}

/// Produces the bytes of one artifact.
pub trait ArtifactGenerator {
    /// # Errors
    ///
    /// Any error is reported as [`GenerationError::Generator`] with the
    /// original error as its source.
    fn generate(&mut self, descriptor: &ArtifactDescriptor) -> Result<Vec<u8>, BoxError>;
}

impl<F> ArtifactGenerator for F
where
    F: FnMut(&ArtifactDescriptor) -> Result<Vec<u8>, BoxError>,
{
    fn generate(&mut self, descriptor: &ArtifactDescriptor) -> Result<Vec<u8>, BoxError> {
        self(descriptor)
    }
}

/// An existing file moved aside before being overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backup {
    pub original: PathBuf,
    pub backup: PathBuf,
}

/// Outcome of a run: what was written, what was moved, and the error that
/// stopped it, if any.
#[derive(Debug, Default)]
pub struct GenerationResult {
    /// Targets written, in emission order.
    pub written: Vec<PathBuf>,
    pub backups: Vec<Backup>,
    pub error: Option<GenerationError>,
}

impl GenerationResult {
    /// A result that failed before anything was written.
    #[must_use]
    pub fn from_error(error: GenerationError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Paths of the backup files, in creation order.
    #[must_use]
    pub fn backup_paths(&self) -> Vec<&Path> {
        self.backups.iter().map(|b| b.backup.as_path()).collect()
    }

    /// Every path a caller has to refresh: written targets, moved originals
    /// and their backups. No duplicates.
    #[must_use]
    pub fn touched_paths(&self) -> Vec<&Path> {
        let mut touched: Vec<&Path> = Vec::new();
        let candidates = self.written.iter().map(PathBuf::as_path).chain(
            self.backups
                .iter()
                .flat_map(|b| [b.original.as_path(), b.backup.as_path()]),
        );
        for path in candidates {
            if !touched.contains(&path) {
                touched.push(path);
            }
        }
        touched
    }
}

/// A failed descriptor, plus a backup that could not be restored.
struct Failure {
    error: GenerationError,
    stranded: Option<Backup>,
}

impl From<GenerationError> for Failure {
    fn from(error: GenerationError) -> Self {
        Self {
            error,
            stranded: None,
        }
    }
}

/// Writes the descriptors of a [`Plan`] in order.
pub struct ArtifactWriter<'a, F> {
    fs: F,
    options: &'a GenerationOptions,
    cancel: Option<Arc<AtomicBool>>,
    stamp: Option<String>,
}

impl<'a, F: FileSystem> ArtifactWriter<'a, F> {
    #[must_use]
    pub const fn new(fs: F, options: &'a GenerationOptions) -> Self {
        Self {
            fs,
            options,
            cancel: None,
            stamp: None,
        }
    }

    /// Check `flag` before every descriptor and stop once it is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Use `stamp` in backup names instead of the current local time.
    #[must_use]
    pub fn with_backup_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = Some(stamp.into());
        self
    }

    /// Write every descriptor of `plan`, stopping at the first failure.
    #[instrument(skip_all, fields(descriptors = plan.len()))]
    pub fn write<G>(&self, plan: &Plan, generator: &mut G) -> GenerationResult
    where
        G: ArtifactGenerator + ?Sized,
    {
        let stamp = self
            .stamp
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y%m%d-%H%M%S").to_string());
        let mut result = GenerationResult::default();

        for descriptor in plan.iter() {
            if self.is_cancelled() {
                result.error = Some(GenerationError::Cancelled {
                    artifact: descriptor.name.clone(),
                });
                break;
            }

            match self.write_one(descriptor, generator, &stamp) {
                Ok(backup) => {
                    result.written.push(descriptor.target_path.clone());
                    result.backups.extend(backup);
                }
                Err(failure) => {
                    result.backups.extend(failure.stranded);
                    result.error = Some(failure.error);
                    break;
                }
            }
        }

        match &result.error {
            None => info!(
                written = result.written.len(),
                backups = result.backups.len(),
                "artifacts written"
            ),
            Some(err) => warn!(
                written = result.written.len(),
                backups = result.backups.len(),
                code = %err.code(),
                "generation stopped: {err}"
            ),
        }
        result
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    fn write_one<G>(
        &self,
        descriptor: &ArtifactDescriptor,
        generator: &mut G,
        stamp: &str,
    ) -> Result<Option<Backup>, Failure>
    where
        G: ArtifactGenerator + ?Sized,
    {
        let target = descriptor.target_path.as_path();
        let exists = self.fs.exists(target);

        if exists && self.options.force_writable_check {
            let read_only = self.fs.is_read_only(target).map_err(|source| GenerationError::Io {
                path: target.to_path_buf(),
                source,
            })?;
            if read_only {
                return Err(GenerationError::ReadOnlyTarget {
                    path: target.to_path_buf(),
                }
                .into());
            }
        }

        let backup = if exists && self.options.backup_existing {
            let backup_path = self.backup_path(target, stamp);
            self.fs
                .rename(target, &backup_path)
                .map_err(|source| GenerationError::BackupFailed {
                    path: target.to_path_buf(),
                    source,
                })?;
            debug!(target = %target.display(), backup = %backup_path.display(), "backed up existing file");
            Some(Backup {
                original: target.to_path_buf(),
                backup: backup_path,
            })
        } else {
            None
        };

        match self.generate_and_write(descriptor, generator) {
            Ok(()) => {
                debug!(artifact = %descriptor.name, target = %target.display(), "artifact written");
                Ok(backup)
            }
            Err(error) => Err(Failure {
                error,
                stranded: backup.and_then(|b| self.restore(b)),
            }),
        }
    }

    fn generate_and_write<G>(
        &self,
        descriptor: &ArtifactDescriptor,
        generator: &mut G,
    ) -> Result<(), GenerationError>
    where
        G: ArtifactGenerator + ?Sized,
    {
        let target = descriptor.target_path.as_path();
        let bytes = generator
            .generate(descriptor)
            .map_err(|source| GenerationError::Generator {
                artifact: descriptor.name.clone(),
                source,
            })?;

        let io_err = |source| GenerationError::Io {
            path: target.to_path_buf(),
            source,
        };
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent).map_err(io_err)?;
        }
        self.fs.write(target, &bytes).map_err(io_err)
    }

    /// Move a backup back into place. Returns it if it stays stranded.
    fn restore(&self, backup: Backup) -> Option<Backup> {
        match self.fs.rename(&backup.backup, &backup.original) {
            Ok(()) => {
                debug!(target = %backup.original.display(), "restored backup after failure");
                None
            }
            Err(err) => {
                warn!(
                    target = %backup.original.display(),
                    backup = %backup.backup.display(),
                    "failed to restore backup: {err}"
                );
                Some(backup)
            }
        }
    }

    fn backup_path(&self, target: &Path, stamp: &str) -> PathBuf {
        let file_name = target
            .file_name()
            .map_or_else(|| "artifact".into(), |name| name.to_string_lossy());
        let mut candidate = target.with_file_name(format!("{file_name}.{stamp}.bak"));
        let mut n = 1u32;
        while self.fs.exists(&candidate) {
            candidate = target.with_file_name(format!("{file_name}.{stamp}-{n}.bak"));
            n += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ArtifactKind;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};

    /// In-memory file system with injectable failures.
    #[derive(Default)]
    struct MemoryFs {
        files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
        read_only: BTreeSet<PathBuf>,
        fail_renames_from: RefCell<BTreeSet<PathBuf>>,
        fail_writes: BTreeSet<PathBuf>,
    }

    impl MemoryFs {
        fn with_file(self, path: &str, contents: &str) -> Self {
            self.files
                .borrow_mut()
                .insert(PathBuf::from(path), contents.as_bytes().to_vec());
            self
        }

        fn content(&self, path: &str) -> Option<String> {
            self.files
                .borrow()
                .get(Path::new(path))
                .map(|b| String::from_utf8_lossy(b).into_owned())
        }
    }

    impl FileSystem for MemoryFs {
        fn exists(&self, path: &Path) -> bool {
            self.files.borrow().contains_key(path)
        }

        fn is_read_only(&self, path: &Path) -> io::Result<bool> {
            Ok(self.read_only.contains(path))
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            if self.fail_renames_from.borrow().contains(from) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "rename refused"));
            }
            let mut files = self.files.borrow_mut();
            let contents = files
                .remove(from)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
            files.insert(to.to_path_buf(), contents);
            Ok(())
        }

        fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }

        fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
            if self.fail_writes.contains(path) {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
            }
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), contents.to_vec());
            Ok(())
        }
    }

    fn descriptor(index: usize, name: &str) -> ArtifactDescriptor {
        ArtifactDescriptor {
            index,
            name: name.to_string(),
            target_path: PathBuf::from(format!("out/{name}.xml")),
            kind: ArtifactKind::Chunk,
            chunks: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    fn plan_of(names: &[&str]) -> Plan {
        Plan {
            descriptors: names
                .iter()
                .enumerate()
                .map(|(i, name)| descriptor(i, name))
                .collect(),
        }
    }

    fn echo(descriptor: &ArtifactDescriptor) -> Result<Vec<u8>, BoxError> {
        Ok(format!("<{}/>", descriptor.name).into_bytes())
    }

    #[test]
    fn writes_every_descriptor_in_order() {
        let fs = MemoryFs::default();
        let options = GenerationOptions::default();
        let result = ArtifactWriter::new(&fs, &options).write(&plan_of(&["a", "b"]), &mut echo);

        assert!(result.is_success());
        assert_eq!(
            result.written,
            vec![PathBuf::from("out/a.xml"), PathBuf::from("out/b.xml")]
        );
        assert_eq!(fs.content("out/b.xml").as_deref(), Some("<b/>"));
        assert!(result.backups.is_empty());
    }

    #[test]
    fn existing_target_is_overwritten_without_backup() {
        let fs = MemoryFs::default().with_file("out/a.xml", "old");
        let options = GenerationOptions::default();
        let result = ArtifactWriter::new(&fs, &options).write(&plan_of(&["a"]), &mut echo);

        assert!(result.is_success());
        assert_eq!(fs.content("out/a.xml").as_deref(), Some("<a/>"));
        assert_eq!(fs.files.borrow().len(), 1);
    }

    #[test]
    fn backup_names_get_numeric_suffix_when_taken() {
        let fs = MemoryFs::default()
            .with_file("out/a.xml", "old")
            .with_file("out/a.xml.20240101-120000.bak", "older");
        let options = GenerationOptions {
            backup_existing: true,
            ..GenerationOptions::default()
        };
        let result = ArtifactWriter::new(&fs, &options)
            .with_backup_stamp("20240101-120000")
            .write(&plan_of(&["a"]), &mut echo);

        assert!(result.is_success());
        assert_eq!(
            result.backup_paths(),
            vec![Path::new("out/a.xml.20240101-120000-1.bak")]
        );
        assert_eq!(fs.content("out/a.xml.20240101-120000-1.bak").as_deref(), Some("old"));
        assert_eq!(fs.content("out/a.xml.20240101-120000.bak").as_deref(), Some("older"));
    }

    #[test]
    fn read_only_target_stops_before_touching_it() {
        let mut fs = MemoryFs::default().with_file("out/b.xml", "locked");
        fs.read_only.insert(PathBuf::from("out/b.xml"));
        let options = GenerationOptions::default();
        let result = ArtifactWriter::new(&fs, &options).write(&plan_of(&["a", "b", "c"]), &mut echo);

        assert!(matches!(result.error, Some(GenerationError::ReadOnlyTarget { ref path }) if path == Path::new("out/b.xml")));
        assert_eq!(result.written, vec![PathBuf::from("out/a.xml")]);
        assert_eq!(fs.content("out/b.xml").as_deref(), Some("locked"));
        assert!(fs.content("out/c.xml").is_none());
    }

    #[test]
    fn disabled_writable_check_ignores_read_only_flag() {
        let mut fs = MemoryFs::default().with_file("out/a.xml", "locked");
        fs.read_only.insert(PathBuf::from("out/a.xml"));
        let options = GenerationOptions {
            force_writable_check: false,
            ..GenerationOptions::default()
        };
        let result = ArtifactWriter::new(&fs, &options).write(&plan_of(&["a"]), &mut echo);
        assert!(result.is_success());
    }

    #[test]
    fn generator_failure_restores_backup() {
        let fs = MemoryFs::default()
            .with_file("out/a.xml", "old-a")
            .with_file("out/b.xml", "old-b");
        let options = GenerationOptions {
            backup_existing: true,
            ..GenerationOptions::default()
        };
        let mut failing_on_b = |d: &ArtifactDescriptor| -> Result<Vec<u8>, BoxError> {
            if d.name == "b" {
                return Err("template missing".into());
            }
            echo(d)
        };
        let result = ArtifactWriter::new(&fs, &options)
            .with_backup_stamp("s")
            .write(&plan_of(&["a", "b"]), &mut failing_on_b);

        assert!(matches!(result.error, Some(GenerationError::Generator { ref artifact, .. }) if artifact == "b"));
        assert_eq!(result.written, vec![PathBuf::from("out/a.xml")]);
        assert_eq!(result.backup_paths(), vec![Path::new("out/a.xml.s.bak")]);
        assert_eq!(fs.content("out/b.xml").as_deref(), Some("old-b"), "backup moved back");
        assert!(fs.content("out/b.xml.s.bak").is_none());
    }

    #[test]
    fn write_failure_names_path_and_restores_backup() {
        let mut fs = MemoryFs::default()
            .with_file("out/a.xml", "old-a")
            .with_file("out/b.xml", "old-b");
        fs.fail_writes.insert(PathBuf::from("out/b.xml"));
        let options = GenerationOptions {
            backup_existing: true,
            ..GenerationOptions::default()
        };
        let result = ArtifactWriter::new(&fs, &options)
            .with_backup_stamp("s")
            .write(&plan_of(&["a", "b", "c"]), &mut echo);

        assert!(matches!(
            result.error,
            Some(GenerationError::Io { ref path, ref source })
                if path == Path::new("out/b.xml") && source.kind() == io::ErrorKind::StorageFull
        ));
        assert_eq!(result.written, vec![PathBuf::from("out/a.xml")]);
        assert_eq!(result.backup_paths(), vec![Path::new("out/a.xml.s.bak")]);
        assert_eq!(fs.content("out/b.xml").as_deref(), Some("old-b"));
        assert!(fs.content("out/b.xml.s.bak").is_none());
        assert!(fs.content("out/c.xml").is_none());
    }

    #[test]
    fn unrestorable_backup_is_reported() {
        let fs = MemoryFs::default().with_file("out/a.xml", "old");
        fs.fail_renames_from
            .borrow_mut()
            .insert(PathBuf::from("out/a.xml.s.bak"));
        let options = GenerationOptions {
            backup_existing: true,
            ..GenerationOptions::default()
        };
        let mut failing = |_: &ArtifactDescriptor| -> Result<Vec<u8>, BoxError> { Err("boom".into()) };
        let result = ArtifactWriter::new(&fs, &options)
            .with_backup_stamp("s")
            .write(&plan_of(&["a"]), &mut failing);

        assert!(result.written.is_empty());
        assert_eq!(result.backup_paths(), vec![Path::new("out/a.xml.s.bak")]);
        assert_eq!(
            result.touched_paths(),
            vec![Path::new("out/a.xml"), Path::new("out/a.xml.s.bak")]
        );
    }

    #[test]
    fn failed_backup_skips_generation() {
        let fs = MemoryFs::default().with_file("out/a.xml", "old");
        fs.fail_renames_from.borrow_mut().insert(PathBuf::from("out/a.xml"));
        let options = GenerationOptions {
            backup_existing: true,
            ..GenerationOptions::default()
        };
        let mut calls = 0;
        let mut counting = |d: &ArtifactDescriptor| -> Result<Vec<u8>, BoxError> {
            calls += 1;
            echo(d)
        };
        let result = ArtifactWriter::new(&fs, &options).write(&plan_of(&["a"]), &mut counting);

        assert!(matches!(result.error, Some(GenerationError::BackupFailed { .. })));
        assert_eq!(calls, 0);
        assert_eq!(fs.content("out/a.xml").as_deref(), Some("old"));
    }

    #[test]
    fn cancel_flag_stops_between_descriptors() {
        let fs = MemoryFs::default();
        let options = GenerationOptions::default();
        let flag = Arc::new(AtomicBool::new(false));
        let trigger = Arc::clone(&flag);
        let mut cancel_after_first = |d: &ArtifactDescriptor| -> Result<Vec<u8>, BoxError> {
            trigger.store(true, Ordering::Release);
            echo(d)
        };
        let result = ArtifactWriter::new(&fs, &options)
            .with_cancel_flag(flag)
            .write(&plan_of(&["a", "b"]), &mut cancel_after_first);

        assert!(matches!(result.error, Some(GenerationError::Cancelled { ref artifact }) if artifact == "b"));
        assert_eq!(result.written, vec![PathBuf::from("out/a.xml")]);
    }

    #[test]
    fn local_fs_write_replaces_content_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a.xml");
        std::fs::write(&target, "old").expect("seed");

        LocalFileSystem.write(&target, b"new").expect("write");

        assert_eq!(std::fs::read_to_string(&target).expect("read"), "new");
        let entries = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn local_fs_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a.xml");
        std::fs::write(&target, "old").expect("seed");
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o640)).expect("chmod");

        LocalFileSystem.write(&target, b"new").expect("write");

        let mode = std::fs::metadata(&target).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn local_fs_write_keeps_read_only_target_read_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a.xml");
        std::fs::write(&target, "old").expect("seed");
        let mut perms = std::fs::metadata(&target).expect("metadata").permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&target, perms).expect("set perms");

        LocalFileSystem.write(&target, b"new").expect("write");

        assert_eq!(std::fs::read_to_string(&target).expect("read"), "new");
        assert!(LocalFileSystem.is_read_only(&target).expect("metadata"));
    }

    #[test]
    fn local_fs_reports_read_only_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a.xml");
        std::fs::write(&target, "x").expect("seed");
        assert!(!LocalFileSystem.is_read_only(&target).expect("metadata"));

        let mut perms = std::fs::metadata(&target).expect("metadata").permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&target, perms).expect("set perms");
        assert!(LocalFileSystem.is_read_only(&target).expect("metadata"));
    }
}
