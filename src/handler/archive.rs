//! Directory archiving module
//!
//! Packages a directory's regular files into a temporary zip archive and
//! serves the archive bytes. The walk is best-effort: files that cannot be
//! read are skipped and the archive keeps the rest.

use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Serve a directory as a freshly built zip archive
///
/// Archive construction is blocking (disk walk plus compression), so it runs
/// on the blocking thread pool. Build failures map to a generic 500.
pub async fn serve_directory(dir: &Path) -> Response<Full<Bytes>> {
    let dir = dir.to_path_buf();
    let built = tokio::task::spawn_blocking(move || build_archive(&dir)).await;

    match built {
        Ok(Ok(bytes)) => http::build_octet_response(Bytes::from(bytes)),
        Ok(Err(e)) => {
            logger::log_error(&format!("Failed to build archive: {e}"));
            http::build_500_response()
        }
        Err(e) => {
            logger::log_error(&format!("Archive worker failed: {e}"));
            http::build_500_response()
        }
    }
}

/// Build a zip archive of every regular file under `dir`
///
/// The archive is written to a uniquely named temp file (the directory name
/// only serves as a prefix hint), finished, and read back into memory. The
/// temp file is removed when its guard drops; the removal outcome is
/// intentionally not checked.
pub fn build_archive(dir: &Path) -> io::Result<Vec<u8>> {
    let prefix = dir.file_name().and_then(|n| n.to_str()).map_or_else(
        || "archive.zip".to_string(),
        |name| format!("{name}.zip"),
    );
    let temp = tempfile::Builder::new().prefix(&prefix).tempfile()?;

    let mut zip = ZipWriter::new(temp.reopen()?);

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                logger::log_warning(&format!("Skipping unreadable entry: {e}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        // Best-effort walk: a file that fails mid-archive is skipped and the
        // remaining files still make it into the archive.
        if let Err(e) = append_entry(&mut zip, dir, entry.path()) {
            logger::log_warning(&format!(
                "Skipping '{}': {}",
                entry.path().display(),
                e
            ));
        }
    }

    zip.finish().map_err(io::Error::other)?;

    // The archive must be fully flushed before this read; the temp file is
    // deleted only after the bytes are in memory.
    std::fs::read(temp.path())
}

/// Add one file to the archive under its path relative to `root`
///
/// The source is opened before the entry is started, so an unreadable file
/// never leaves an empty entry behind.
fn append_entry(zip: &mut ZipWriter<File>, root: &Path, path: &Path) -> io::Result<()> {
    let relative = path.strip_prefix(root).map_err(io::Error::other)?;
    let mut source = File::open(path)?;
    zip.start_file(
        relative.to_string_lossy().into_owned(),
        SimpleFileOptions::default(),
    )
    .map_err(io::Error::other)?;
    io::copy(&mut source, zip)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs as std_fs;
    use std::io::{Cursor, Read};

    fn read_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            entries.push((file.name().to_string(), content));
        }
        entries
    }

    #[test]
    fn test_archive_flat_directory() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("a.txt"), b"A").unwrap();
        std_fs::write(dir.path().join("b.txt"), b"B").unwrap();

        let bytes = build_archive(dir.path()).unwrap();
        let entries = read_entries(&bytes);

        let names: HashSet<_> = entries.iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(
            names,
            HashSet::from(["a.txt".to_string(), "b.txt".to_string()])
        );
        for (name, content) in entries {
            match name.as_str() {
                "a.txt" => assert_eq!(content, b"A"),
                "b.txt" => assert_eq!(content, b"B"),
                other => panic!("Unexpected entry {other}"),
            }
        }
    }

    #[test]
    fn test_archive_nested_entries_use_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
        std_fs::write(dir.path().join("top.txt"), b"top").unwrap();
        std_fs::write(dir.path().join("sub/mid.txt"), b"mid").unwrap();
        std_fs::write(dir.path().join("sub/inner/deep.txt"), b"deep").unwrap();

        let bytes = build_archive(dir.path()).unwrap();
        let names: HashSet<_> = read_entries(&bytes).into_iter().map(|(n, _)| n).collect();

        assert_eq!(
            names,
            HashSet::from([
                "top.txt".to_string(),
                "sub/mid.txt".to_string(),
                "sub/inner/deep.txt".to_string(),
            ])
        );
    }

    #[test]
    fn test_archive_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = build_archive(dir.path()).unwrap();
        // Still a valid zip, just with no entries
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_archive_contains_no_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::create_dir(dir.path().join("empty_sub")).unwrap();
        std_fs::create_dir(dir.path().join("full_sub")).unwrap();
        std_fs::write(dir.path().join("full_sub/f.txt"), b"f").unwrap();

        let bytes = build_archive(dir.path()).unwrap();
        let names: Vec<_> = read_entries(&bytes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["full_sub/f.txt".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_skips_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("real.txt"), b"real").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("broken")).unwrap();

        let bytes = build_archive(dir.path()).unwrap();
        let names: Vec<_> = read_entries(&bytes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["real.txt".to_string()]);
    }

    #[test]
    fn test_archive_idempotent_contents() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::create_dir(dir.path().join("sub")).unwrap();
        std_fs::write(dir.path().join("x.txt"), b"xx").unwrap();
        std_fs::write(dir.path().join("sub/y.txt"), b"yy").unwrap();

        let first: HashSet<_> = read_entries(&build_archive(dir.path()).unwrap())
            .into_iter()
            .collect();
        let second: HashSet<_> = read_entries(&build_archive(dir.path()).unwrap())
            .into_iter()
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_temp_archive_removed_after_build() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("f.txt"), b"f").unwrap();

        build_archive(dir.path()).unwrap();

        // The temp archive carries the directory name as its prefix; none
        // may remain once the build has returned.
        let dir_name = dir.path().file_name().unwrap().to_str().unwrap();
        let prefix = format!("{dir_name}.zip");
        let leftovers = std_fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .count();
        assert_eq!(leftovers, 0);
    }
}
