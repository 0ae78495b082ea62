use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::BbsError;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Largest image field accepted from a multipart body.
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Checks the text after the last `.` against `ALLOWED_EXTENSIONS`, ignoring case.
pub fn is_allowed(filename: &str) -> bool {
    match filename.rfind('.') {
        Some(idx) => {
            let ext = filename[idx + 1..].to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        },
        None => false,
    }
}

/// Reduces a client-supplied file name to something safe to join onto the upload directory.
///
/// Only the last path component survives, with anything outside `[A-Za-z0-9._-]` dropped and
/// leading dots stripped, so `../../etc/passwd` becomes `passwd` and `..` becomes nothing.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || *c == '_')
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// The sanitized name to store an upload under, if both the client's name and the
/// sanitized one carry an allowed extension.
pub fn accepted_name(filename: &str) -> Option<String> {
    if !is_allowed(filename) {
        return None;
    }
    sanitize_filename(filename).filter(|name| is_allowed(name))
}

/// Writes `data` into `upload_dir` and returns the stored name, relative to `upload_dir`.
pub fn store(upload_dir: &Path, filename: &str, data: &[u8]) -> Result<String, BbsError> {
    let name = sanitize_filename(filename)
        .ok_or_else(|| BbsError::UploadRejected(format!("unusable file name {:?}", filename)))?;

    let target = confine(upload_dir, &name)?;

    fs::create_dir_all(upload_dir)?;
    fs::write(&target, data)?;

    debug!("stored upload {}", target.display());
    Ok(name)
}

// The joined path must sit directly inside the upload directory and keep its name.
fn confine(upload_dir: &Path, name: &str) -> Result<PathBuf, BbsError> {
    let target = upload_dir.join(name);

    let parent_ok = target.parent() == Some(upload_dir);
    let name_ok = target.file_name().and_then(|n| n.to_str()) == Some(name);

    if parent_ok && name_ok {
        Ok(target)
    } else {
        Err(BbsError::UploadRejected(format!("{:?} escapes the upload directory", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn allow_list_ignores_case() {
        assert!(is_allowed("photo.JPG"));
        assert!(is_allowed("photo.jpeg"));
        assert!(is_allowed("anim.Gif"));
        assert!(is_allowed("archive.tar.png"));
        assert!(!is_allowed("photo.EXE"));
        assert!(!is_allowed("png"));
        assert!(!is_allowed("photo."));
        assert!(!is_allowed(""));
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd.png").as_deref(), Some("passwd.png"));
        assert_eq!(sanitize_filename("C:\\Users\\me\\cat.gif").as_deref(), Some("cat.gif"));
        assert_eq!(sanitize_filename("/abs/path/x.jpg").as_deref(), Some("x.jpg"));
    }

    #[test]
    fn sanitize_drops_unsafe_characters() {
        assert_eq!(sanitize_filename("my photo (1).PNG").as_deref(), Some("myphoto1.PNG"));
        assert_eq!(sanitize_filename("..hidden.png").as_deref(), Some("hidden.png"));
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename("???"), None);
    }

    #[test]
    fn accepted_name_needs_an_extension_after_sanitizing() {
        assert_eq!(accepted_name("photo.JPG").as_deref(), Some("photo.JPG"));
        assert_eq!(accepted_name("../up/photo.gif").as_deref(), Some("photo.gif"));
        assert_eq!(accepted_name("photo.EXE"), None);
        assert_eq!(accepted_name(".png"), None);
        assert_eq!(accepted_name("photo.p?ng"), None);
    }

    #[test]
    fn store_writes_inside_upload_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("uploads");

        let name = store(&dir, "../evil/photo.JPG", b"jpeg bytes").unwrap();

        assert_eq!(name, "photo.JPG");
        assert_eq!(fs::read(dir.join(&name)).unwrap(), b"jpeg bytes");
        assert!(!tmp.path().join("evil").exists());
    }

    #[test]
    fn confine_rejects_names_that_leave_the_directory() {
        let dir = Path::new("/srv/uploads");

        assert_eq!(confine(dir, "x.png").unwrap(), PathBuf::from("/srv/uploads/x.png"));
        for name in &["../x.png", "sub/x.png", "..", "/etc/x.png"] {
            match confine(dir, name) {
                Err(BbsError::UploadRejected(_)) => {},
                other => panic!("{:?} should be rejected, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn store_overwrites_existing_name() {
        let tmp = TempDir::new().unwrap();

        store(tmp.path(), "a.png", b"first").unwrap();
        store(tmp.path(), "a.png", b"second").unwrap();

        assert_eq!(fs::read(tmp.path().join("a.png")).unwrap(), b"second");
    }

    #[test]
    fn store_rejects_empty_name() {
        let tmp = TempDir::new().unwrap();

        match store(tmp.path(), "../..", b"x") {
            Err(BbsError::UploadRejected(_)) => {},
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
