//! Upload acceptance policy and storage.
//!
//! Every file offered by the admin form passes through here. Nothing is
//! skipped silently: each file ends up in `accepted` or `rejected`, and the
//! handler shows the caller both lists.

use std::path::Path;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Sanitized filename the file was written under.
    pub name: String,
    /// Site-relative URL the file is served from.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub accepted: Vec<StoredFile>,
    pub rejected: Vec<RejectedFile>,
}

impl UploadOutcome {
    /// Validate one uploaded file and, if it passes, write it to the
    /// uploads directory. Policy failures land in `rejected`; only real
    /// I/O failures surface as errors.
    pub fn save(
        &mut self,
        uploads_dir: &Path,
        filename: &str,
        data: &[u8],
    ) -> std::io::Result<()> {
        if !allowed_file(filename) {
            self.rejected.push(RejectedFile {
                name: filename.to_string(),
                reason: "extension not allowed".to_string(),
            });
            return Ok(());
        }

        let safe_name = sanitize_filename(filename);
        if safe_name.is_empty() {
            self.rejected.push(RejectedFile {
                name: filename.to_string(),
                reason: "invalid filename".to_string(),
            });
            return Ok(());
        }

        if data.is_empty() {
            self.rejected.push(RejectedFile {
                name: filename.to_string(),
                reason: "empty file".to_string(),
            });
            return Ok(());
        }

        std::fs::write(uploads_dir.join(&safe_name), data)?;
        tracing::debug!(file = %safe_name, bytes = data.len(), "stored upload");

        self.accepted.push(StoredFile {
            url: format!("/uploads/{}", safe_name),
            name: safe_name,
        });
        Ok(())
    }
}

/// Extension allow-list check, case-insensitive.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to something safe to write:
/// keep only the last path component, drop everything outside
/// `[A-Za-z0-9._-]`, and strip leading dots.
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    last.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_is_rejected() {
        assert!(!allowed_file("payload.exe"));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(allowed_file("photo.JPG"));
        assert!(allowed_file("photo.png"));
        assert!(allowed_file("photo.GIF"));
    }

    #[test]
    fn no_extension_is_rejected() {
        assert!(!allowed_file("README"));
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "passwd.png");
        assert_eq!(sanitize_filename("..\\..\\boot.png"), "boot.png");
    }

    #[test]
    fn sanitize_drops_unsafe_characters() {
        assert_eq!(sanitize_filename("my photo (1).png"), "myphoto1.png");
        assert_eq!(sanitize_filename("héllo.png"), "hllo.png");
    }

    #[test]
    fn sanitize_strips_leading_dots() {
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("...png"), "png");
    }

    #[test]
    fn save_accepts_and_writes_allowed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut outcome = UploadOutcome::default();

        outcome.save(tmp.path(), "photo.JPG", b"jpegdata").unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected.len(), 0);
        assert_eq!(outcome.accepted[0].url, "/uploads/photo.JPG");
        assert!(tmp.path().join("photo.JPG").exists());
    }

    #[test]
    fn save_reports_rejected_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let mut outcome = UploadOutcome::default();

        outcome.save(tmp.path(), "payload.exe", b"MZ").unwrap();

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].name, "payload.exe");
        assert_eq!(outcome.rejected[0].reason, "extension not allowed");
        assert!(!tmp.path().join("payload.exe").exists());
    }

    #[test]
    fn save_rejects_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut outcome = UploadOutcome::default();

        outcome.save(tmp.path(), "empty.png", b"").unwrap();

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected[0].reason, "empty file");
    }

    #[test]
    fn save_writes_under_sanitized_name() {
        let tmp = tempfile::tempdir().unwrap();
        let mut outcome = UploadOutcome::default();

        outcome
            .save(tmp.path(), "../escape attempt.png", b"data")
            .unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].name, "escapeattempt.png");
        assert!(tmp.path().join("escapeattempt.png").exists());
    }
}
