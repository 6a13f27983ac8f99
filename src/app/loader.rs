// LogcatView - app/loader.rs
//
// Loading orchestration: reads files, folders and bug reports, parses them
// and hands the records to the registered listeners.
//
// Architecture:
//   - `LogLoader` owns its listeners; they are passed in at construction.
//   - Folder loads parse every dispatched file in parallel on the rayon
//     pool, then deliver on the calling thread in file-name order so
//     listeners never need to be thread-safe.
//   - All per-file errors are non-fatal: a file that cannot be read is
//     logged and contributes no records.

use crate::app::events::RecordListener;
use crate::core::bugreport;
use crate::core::format::FormatKind;
use crate::core::model::{Channel, LogRecord, SourceFile};
use crate::core::parser::{self, ParseResult};
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{self, LoadError};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Settings that influence how files are read.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Files above this size are memory-mapped.
    pub large_file_threshold: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
        }
    }
}

impl From<&AppConfig> for LoadConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            large_file_threshold: config.large_file_threshold,
        }
    }
}

/// Reads log input and delivers parsed records to listeners.
pub struct LogLoader {
    listeners: Vec<Box<dyn RecordListener>>,
    config: LoadConfig,
}

impl LogLoader {
    pub fn new(listeners: Vec<Box<dyn RecordListener>>, config: LoadConfig) -> Self {
        Self { listeners, config }
    }

    pub fn add_listener(&mut self, listener: Box<dyn RecordListener>) {
        self.listeners.push(listener);
    }

    /// Read and parse one file without delivering anything.
    pub fn parse_log_file(&self, path: &Path) -> Result<ParseResult, LoadError> {
        parse_log_file(path, &self.config)
    }

    /// Load whatever `path` names: a folder of channel files, a bug report
    /// when `bug_report` is set, otherwise a single file on the main channel.
    ///
    /// Returns the number of files or sections delivered. A path that cannot
    /// be inspected, or one that yields nothing, is an error.
    pub fn load_path(&self, path: &Path, bug_report: bool) -> error::Result<usize> {
        let meta = std::fs::metadata(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let delivered = if meta.is_dir() {
            self.load_folder(path)
        } else if bug_report {
            self.load_bug_report(path)
        } else {
            usize::from(self.load_file(path, Channel::Main).is_some())
        };

        if delivered == 0 {
            return Err(LoadError::NothingLoaded {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(delivered)
    }

    /// Load a single log file onto `channel`.
    ///
    /// Returns the detected format, or `None` if the file could not be read
    /// or no line matched a known format; nothing is delivered in that case.
    pub fn load_file(&self, path: &Path, channel: Channel) -> Option<FormatKind> {
        let result = match self.parse_log_file(path) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "File load failed");
                return None;
            }
        };
        self.deliver_parsed(path, channel, result)
    }

    /// Load every file directly inside `dir` whose name routes it to a
    /// channel. Returns the number of files delivered.
    pub fn load_folder(&self, dir: &Path) -> usize {
        let start = Instant::now();
        let files = match dispatch_folder(dir) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Folder load failed");
                return 0;
            }
        };

        let config = &self.config;
        let parsed: Vec<(PathBuf, Channel, Result<ParseResult, LoadError>)> = files
            .into_par_iter()
            .map(|(path, channel)| {
                let result = parse_log_file(&path, config);
                (path, channel, result)
            })
            .collect();

        let mut delivered = 0;
        for (path, channel, result) in parsed {
            match result {
                Ok(result) => {
                    if self.deliver_parsed(&path, channel, result).is_some() {
                        delivered += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "File load failed");
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            files = delivered,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Folder loaded"
        );
        delivered
    }

    /// Load a bug report, delivering each non-empty log section to its
    /// channel. Returns the number of sections delivered.
    pub fn load_bug_report(&self, path: &Path) -> usize {
        let lines = match read_lines(path, &self.config) {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Bug report load failed");
                return 0;
            }
        };

        let sections = bugreport::parse_bug_report(&lines);
        let file = SourceFile::from_path(path);
        for (channel, records) in &sections {
            self.deliver(records, *channel, &file);
        }

        tracing::info!(
            file = %path.display(),
            sections = sections.len(),
            "Bug report loaded"
        );
        sections.len()
    }

    fn deliver_parsed(
        &self,
        path: &Path,
        channel: Channel,
        result: ParseResult,
    ) -> Option<FormatKind> {
        let Some(format) = result.format else {
            tracing::warn!(file = %path.display(), "No known logcat format found");
            return None;
        };
        tracing::info!(
            file = %path.display(),
            format = %format,
            channel = %channel,
            records = result.records.len(),
            "File loaded"
        );
        self.deliver(&result.records, channel, &SourceFile::from_path(path));
        Some(format)
    }

    fn deliver(&self, records: &[LogRecord], channel: Channel, file: &SourceFile) {
        for listener in &self.listeners {
            listener.on_records_received(records, channel, file);
        }
    }
}

fn read_lines(path: &Path, config: &LoadConfig) -> Result<Vec<String>, LoadError> {
    fs::read_log_lines(path, config.large_file_threshold).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a file and parse it with format auto-detection.
pub fn parse_log_file(path: &Path, config: &LoadConfig) -> Result<ParseResult, LoadError> {
    let lines = read_lines(path, config)?;
    tracing::debug!(file = %path.display(), lines = lines.len(), "File read");
    Ok(parser::parse_lines(&lines))
}

/// List the files directly inside `dir` that route to a channel, sorted by
/// file name. Subdirectories are not entered.
pub fn dispatch_folder(dir: &Path) -> Result<Vec<(PathBuf, Channel)>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| LoadError::Traversal {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let channel = Channel::from_file_name(&entry.file_name().to_string_lossy());
        match channel {
            Some(channel) => files.push((entry.into_path(), channel)),
            None => tracing::debug!(file = %entry.path().display(), "No channel for file; skipped"),
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RecordBatch;
    use crate::util::error::LogcatError;
    use std::io;
    use std::sync::{mpsc, Arc, Mutex};

    const TT: &str = "04-08 12:57:40.370    89   103 I Installer: connecting...\n";

    fn loader() -> (LogLoader, mpsc::Receiver<RecordBatch>) {
        let (tx, rx) = mpsc::channel();
        (LogLoader::new(vec![Box::new(tx)], LoadConfig::default()), rx)
    }

    /// Debug output captured from a scoped `tracing` subscriber.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_dispatch_folder_routes_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["radio.txt", "EVENTS.log", "main_2.txt", "main_1.txt", "kernel.txt"] {
            std::fs::write(dir.path().join(name), TT).unwrap();
        }
        std::fs::create_dir(dir.path().join("main_dir")).unwrap();

        let files = dispatch_folder(dir.path()).unwrap();
        let names: Vec<(String, Channel)> = files
            .iter()
            .map(|(p, c)| (p.file_name().unwrap().to_string_lossy().into_owned(), *c))
            .collect();
        assert_eq!(
            names,
            vec![
                ("EVENTS.log".to_string(), Channel::Events),
                ("main_1.txt".to_string(), Channel::Main),
                ("main_2.txt".to_string(), Channel::Main),
                ("radio.txt".to_string(), Channel::Radio),
            ]
        );
    }

    #[test]
    fn test_dispatch_rejects_file_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            dispatch_folder(file.path()),
            Err(LoadError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_load_file_delivers_to_every_listener() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.txt");
        std::fs::write(&path, TT).unwrap();

        let (tx_a, rx_a) = mpsc::channel::<RecordBatch>();
        let (tx_b, rx_b) = mpsc::channel::<RecordBatch>();
        let mut loader = LogLoader::new(vec![Box::new(tx_a)], LoadConfig::default());
        loader.add_listener(Box::new(tx_b));

        assert_eq!(loader.load_file(&path, Channel::Main), Some(FormatKind::ThreadTime));
        let a = rx_a.try_recv().unwrap();
        let b = rx_b.try_recv().unwrap();
        assert_eq!(a.records.len(), 1);
        assert_eq!(a.file.name, "main.txt");
        assert!(a.file.path.is_absolute());
        assert_eq!(b.channel, Channel::Main);
    }

    #[test]
    fn test_missing_file_delivers_nothing() {
        let (loader, rx) = loader();
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(loader.load_file(&dir.path().join("nope.txt"), Channel::Main), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unrecognised_file_delivers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.txt");
        std::fs::write(&path, "just some prose\nwith no log lines\n").unwrap();

        let (loader, rx) = loader();
        assert_eq!(loader.load_file(&path, Channel::Main), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_load_folder_delivers_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_main.txt"), TT).unwrap();
        std::fs::write(dir.path().join("a_radio.txt"), TT).unwrap();
        std::fs::write(dir.path().join("c_events.txt"), "I/Tag(1): brief\n").unwrap();

        let (loader, rx) = loader();
        assert_eq!(loader.load_folder(dir.path()), 3);
        let channels: Vec<Channel> = rx.try_iter().map(|b| b.channel).collect();
        assert_eq!(channels, vec![Channel::Radio, Channel::Main, Channel::Events]);
    }

    #[test]
    fn test_load_folder_on_missing_dir_is_empty() {
        let (loader, rx) = loader();
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(loader.load_folder(&dir.path().join("gone")), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_parse_log_file_logs_one_completion_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.txt");
        std::fs::write(&path, TT).unwrap();

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            parse_log_file(&path, &LoadConfig::default()).unwrap()
        });

        assert_eq!(result.records.len(), 1);
        let text = log.text();
        assert_eq!(text.matches("Parsing complete").count(), 1, "{text}");
        assert_eq!(text.matches("File read").count(), 1, "{text}");
    }

    #[test]
    fn test_load_path_picks_the_loader_for_the_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.txt"), TT).unwrap();
        std::fs::write(dir.path().join("radio.txt"), TT).unwrap();

        let (loader, rx) = loader();
        assert_eq!(loader.load_path(dir.path(), false).unwrap(), 2);
        assert_eq!(rx.try_iter().count(), 2);

        let file = dir.path().join("main.txt");
        assert_eq!(loader.load_path(&file, false).unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap().channel, Channel::Main);
    }

    #[test]
    fn test_load_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, rx) = loader();

        let missing = loader.load_path(&dir.path().join("missing.txt"), false);
        assert!(matches!(
            missing,
            Err(LogcatError::Load(LoadError::Io { .. }))
        ));

        let noise = dir.path().join("notes.txt");
        std::fs::write(&noise, "nothing to see here\n").unwrap();
        let err = loader.load_path(&noise, false).unwrap_err();
        assert!(matches!(err, LogcatError::Load(LoadError::NothingLoaded { .. })));
        assert!(err.to_string().contains("notes.txt"), "{err}");

        // A bug report with no log sections delivers nothing either.
        assert!(loader.load_path(&noise, true).is_err());
        assert!(rx.try_recv().is_err());
    }
}
