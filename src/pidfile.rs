//! Optional PID file writing (§6). The engine never decides whether to
//! write one; callers that want the behavior call [`write_pid_file`]
//! themselves after the compositing manager selection is acquired.

use std::io::Write as _;
use std::path::Path;

/// Writes the current process's PID, followed by a newline, to `path`.
///
/// Truncates any existing file at `path` rather than appending, matching
/// the usual daemon convention of one PID per file.
pub fn write_pid_file(path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", std::process::id())?;
    tracing::debug!(path = %path.display(), "wrote pid file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_pid_followed_by_newline() {
        let dir = std::env::temp_dir().join(format!("engine-pidfile-test-{}", std::process::id()));
        write_pid_file(&dir).unwrap();
        let contents = std::fs::read_to_string(&dir).unwrap();
        assert_eq!(contents, format!("{}\n", std::process::id()));
        std::fs::remove_file(&dir).unwrap();
    }

    #[test]
    fn truncates_a_pre_existing_file() {
        let dir = std::env::temp_dir().join(format!("engine-pidfile-test-trunc-{}", std::process::id()));
        std::fs::write(&dir, "99999999\nstale garbage\n").unwrap();
        write_pid_file(&dir).unwrap();
        let contents = std::fs::read_to_string(&dir).unwrap();
        assert_eq!(contents, format!("{}\n", std::process::id()));
        std::fs::remove_file(&dir).unwrap();
    }
}
