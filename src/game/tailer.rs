//! Incremental log file tailer.
//!
//! Watches the server log directory, tracks a byte offset into the active
//! file, and yields complete lines as they are appended. Two triggers feed
//! one state machine: a fixed 5 second poll for file growth, and a
//! directory create notification for rotation. Both run on the tailer's own
//! task, so `TailState` has a single owner and mutation is serialized.
//!
//! Rotation resets the offset to the new file's length at the moment of
//! detection; content written between file creation and the notification
//! being observed is skipped. That window is a known limitation of
//! notification-based rotation, not something this module tries to recover.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Poll interval for file growth.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Extension of server log files.
const LOG_EXTENSION: &str = "log";

/// Active file identity and read position.
///
/// The offset is monotonically non-decreasing for a given file, never
/// exceeds the file's length, and always lands exactly after the last
/// complete line consumed.
#[derive(Debug)]
pub struct TailState {
    file: Option<PathBuf>,
    offset: u64,
}

impl TailState {
    /// Start tailing the file with the latest modification time in `dir`.
    ///
    /// The offset starts at the active file's current length, so only
    /// content appended later is ever delivered. If the directory holds no
    /// log files yet, the state idles until a rotation notification arrives.
    pub fn discover(dir: &Path) -> io::Result<Self> {
        match select_active_file(dir)? {
            Some(path) => {
                let offset = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                info!("Tailing {} from offset {}", path.display(), offset);
                Ok(Self {
                    file: Some(path),
                    offset,
                })
            }
            None => {
                warn!("No log files in {} yet, waiting for one", dir.display());
                Ok(Self {
                    file: None,
                    offset: 0,
                })
            }
        }
    }

    /// One poll tick: read forward from the stored offset and send each
    /// complete line. A locked or missing file counts as "no growth".
    ///
    /// Errs only when the line receiver is gone.
    pub fn poll(&mut self, line_tx: &mpsc::UnboundedSender<String>) -> Result<(), ()> {
        let Some(ref path) = self.file else {
            return Ok(());
        };

        match read_new_lines(path, self.offset) {
            Ok((lines, offset)) => {
                self.offset = offset;
                for line in lines {
                    line_tx.send(line).map_err(|_| ())?;
                }
            }
            Err(e) => {
                debug!("Skipping tick for {}: {}", path.display(), e);
            }
        }

        Ok(())
    }

    /// Replace the active file after a rotation notification.
    pub fn switch_to(&mut self, path: PathBuf) {
        // The file was just created; if it cannot be stat'ed yet, start at 0.
        let offset = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        info!(
            "Log rotated, now tailing {} from offset {}",
            path.display(),
            offset
        );
        self.file = Some(path);
        self.offset = offset;
    }

    #[cfg(test)]
    fn offset(&self) -> u64 {
        self.offset
    }
}

/// Tails the newest log file in a directory.
pub struct LogTailer {
    state: TailState,
    rotation_rx: mpsc::UnboundedReceiver<PathBuf>,
    // Dropping the watcher stops notifications, so it lives here.
    _watcher: RecommendedWatcher,
}

impl LogTailer {
    /// Set up the tailer: pick the active file and start the rotation watcher.
    pub fn new(dir: &Path) -> anyhow::Result<Self> {
        let (rotation_tx, rotation_rx) = mpsc::unbounded_channel();

        let mut watcher =
            notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
                let Ok(event) = event else { return };
                if !matches!(event.kind, EventKind::Create(_)) {
                    return;
                }
                for path in event.paths {
                    if path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION) {
                        // Receiver gone means the tail task stopped; nothing to do.
                        let _ = rotation_tx.send(path);
                    }
                }
            })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            state: TailState::discover(dir)?,
            rotation_rx,
            _watcher: watcher,
        })
    }

    /// Run the tail loop, sending complete lines in file order.
    ///
    /// Returns only when the line receiver or the watcher goes away.
    pub async fn run(self, line_tx: mpsc::UnboundedSender<String>) {
        let LogTailer {
            mut state,
            mut rotation_rx,
            _watcher,
        } = self;

        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if state.poll(&line_tx).is_err() {
                        return;
                    }
                }
                rotated = rotation_rx.recv() => {
                    match rotated {
                        Some(path) => state.switch_to(path),
                        None => return,
                    }
                }
            }
        }
    }
}

/// Pick the log file with the latest modification time.
///
/// The directory enumeration order is not meaningful, so recency is decided
/// explicitly by mtime.
pub fn select_active_file(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// Read complete lines appended since `offset`.
///
/// Returns the lines and the new offset, which lands exactly after the last
/// newline consumed; a trailing unterminated line is left for the next call.
/// A file shorter than `offset` yields nothing and clamps the offset to the
/// file's length.
pub fn read_new_lines(path: &Path, offset: u64) -> io::Result<(Vec<String>, u64)> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    if len == offset {
        return Ok((Vec::new(), offset));
    }
    if len < offset {
        return Ok((Vec::new(), len));
    }

    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    let Some(last_newline) = buf.iter().rposition(|&b| b == b'\n') else {
        // Only a partial line so far; wait for the newline.
        return Ok((Vec::new(), offset));
    };

    let complete = &buf[..=last_newline];
    let lines = String::from_utf8_lossy(complete)
        .lines()
        .map(str::to_string)
        .collect();

    Ok((lines, offset + last_newline as u64 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, SystemTime};

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_appended_complete_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "server.log", "old line\n");
        let offset = std::fs::metadata(&path).unwrap().len();

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "first new\nsecond new\n").unwrap();

        let (lines, new_offset) = read_new_lines(&path, offset).unwrap();
        assert_eq!(lines, vec!["first new", "second new"]);
        assert_eq!(new_offset, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn withholds_trailing_partial_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "server.log", "");

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "complete line\npartial").unwrap();

        let (lines, offset) = read_new_lines(&path, 0).unwrap();
        assert_eq!(lines, vec!["complete line"]);
        // Offset lands after the newline, not at end of file.
        assert_eq!(offset, "complete line\n".len() as u64);

        // Nothing new until the partial line is terminated.
        let (lines, offset2) = read_new_lines(&path, offset).unwrap();
        assert_eq!(lines, Vec::<String>::new());
        assert_eq!(offset2, offset);

        write!(file, " now done\n").unwrap();
        let (lines, offset3) = read_new_lines(&path, offset2).unwrap();
        assert_eq!(lines, vec!["partial now done"]);
        assert_eq!(offset3, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn unchanged_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "server.log", "line\n");
        let offset = std::fs::metadata(&path).unwrap().len();

        let (lines, new_offset) = read_new_lines(&path, offset).unwrap();
        assert!(lines.is_empty());
        assert_eq!(new_offset, offset);
    }

    #[test]
    fn offset_never_exceeds_file_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "server.log", "short\n");

        let (lines, offset) = read_new_lines(&path, 1000).unwrap();
        assert!(lines.is_empty());
        assert_eq!(offset, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "server.log", "one\r\ntwo\r\n");

        let (lines, _) = read_new_lines(&path, 0).unwrap();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn selects_file_with_latest_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let older = write_file(dir.path(), "a.log", "old\n");
        let newer = write_file(dir.path(), "b.log", "new\n");
        write_file(dir.path(), "notes.txt", "not a log\n");

        // Make the mtime ordering explicit instead of relying on write order.
        let now = SystemTime::now();
        File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(now - Duration::from_secs(3600))
            .unwrap();
        File::options()
            .write(true)
            .open(&newer)
            .unwrap()
            .set_modified(now)
            .unwrap();

        let active = select_active_file(dir.path()).unwrap();
        assert_eq!(active, Some(newer));
    }

    #[test]
    fn empty_directory_selects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(select_active_file(dir.path()).unwrap(), None);
    }

    #[test]
    fn missing_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.log");
        assert!(read_new_lines(&path, 0).is_err());
    }

    #[test]
    fn discovery_starts_at_end_of_active_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "server.log", "historical content\n");

        let state = TailState::discover(dir.path()).unwrap();
        assert_eq!(state.offset(), std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn poll_only_delivers_content_appended_after_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "server.log", "historical content\n");

        let mut state = TailState::discover(dir.path()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        state.poll(&tx).unwrap();
        assert!(rx.try_recv().is_err());

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "fresh line\n").unwrap();

        state.poll(&tx).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "fresh line");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rotation_resets_offset_to_new_file_length() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.log", "aaaa\n");

        let mut state = TailState::discover(dir.path()).unwrap();
        let rotated = write_file(dir.path(), "b.log", "pre-existing\n");
        state.switch_to(rotated.clone());

        assert_eq!(state.offset(), std::fs::metadata(&rotated).unwrap().len());

        // Pre-existing content in the just-discovered file is never read.
        let (tx, mut rx) = mpsc::unbounded_channel();
        state.poll(&tx).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn missing_active_file_is_treated_as_no_growth() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.log", "aaaa\n");

        let mut state = TailState::discover(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join("a.log")).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        // Must not error or panic; retried next interval.
        state.poll(&tx).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
