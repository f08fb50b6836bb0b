use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::error::AppError;
use crate::outcome::OutcomeRecord;
use crate::output::{ensure_dir, timestamp};
use crate::traits::ErrorSink;

/// Size threshold after which the sink advances to the next log file.
pub const DEFAULT_MAX_LOG_SIZE: u64 = 500 * 1024;

/// Append-only error log split across numbered files.
///
/// Files are named `<base>-<run-timestamp>[-<index>].log`, index 0
/// omitted; the run timestamp is fixed when the sink is constructed so
/// one run never appends into a previous run's files. Before each append
/// the active file's size is checked against the threshold and the index
/// advances if it is exceeded. The index only ever grows: rotation is
/// monotonic within a run and unbounded across it.
#[derive(Debug)]
pub struct RotatingFileSink {
    dir: PathBuf,
    base: String,
    run_stamp: String,
    max_size: u64,
    index: u32,
}

impl RotatingFileSink {
    pub fn new(dir: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base: base.into(),
            run_stamp: timestamp(),
            max_size: DEFAULT_MAX_LOG_SIZE,
            index: 0,
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Path of the file the next record would be appended to, before
    /// any rotation check.
    pub fn active_path(&self) -> PathBuf {
        self.path_for(self.index)
    }

    /// Every log file this run has written so far, oldest first.
    ///
    /// Useful for reporting at the end of a run; files from earlier runs
    /// (different run timestamp) are not included.
    pub fn written_paths(&self) -> Vec<PathBuf> {
        (0..=self.index)
            .map(|index| self.path_for(index))
            .filter(|path| path.exists())
            .collect()
    }

    fn path_for(&self, index: u32) -> PathBuf {
        let file_name = if index == 0 {
            format!("{}-{}.log", self.base, self.run_stamp)
        } else {
            format!("{}-{}-{}.log", self.base, self.run_stamp, index)
        };
        self.dir.join(file_name)
    }

    fn rotate_if_oversized(&mut self) {
        let path = self.active_path();
        if let Ok(meta) = std::fs::metadata(&path) {
            if meta.len() > self.max_size {
                self.index += 1;
                tracing::info!(
                    "error log exceeded {} bytes, rotating to {}",
                    self.max_size,
                    self.active_path().display()
                );
            }
        }
    }
}

impl ErrorSink for RotatingFileSink {
    fn append(&mut self, record: &OutcomeRecord) -> Result<(), AppError> {
        ensure_dir(&self.dir)?;
        self.rotate_if_oversized();

        let path = self.active_path();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(format_record(record).as_bytes())?;

        tracing::debug!("error record appended to {}", path.display());
        Ok(())
    }
}

/// Serialize a record as the fixed-field block the log files carry.
///
/// The field labels are the wire format consumed by downstream tooling;
/// do not translate them.
fn format_record(record: &OutcomeRecord) -> String {
    let response = serde_json::to_string_pretty(&record.response)
        .unwrap_or_else(|_| record.response.to_string());
    format!(
        "接口名称: {name}\n\
         接口地址: {url}\n\
         请求方法: {method}\n\
         请求参数: {params}\n\
         请求数据: {data}\n\
         HTTP状态: {status}\n\
         耗时: {elapsed}ms\n\
         返回内容: {response}\n\
         错误类型: {class}\n\
         时间: {time}\n\
         -----------------------------\n",
        name = record.endpoint,
        url = record.url,
        method = record.method,
        params = record.params,
        data = record.data,
        status = record.status,
        elapsed = record.elapsed_ms,
        response = response,
        class = record.classification,
        time = Local::now().format("%Y-%m-%d %H:%M:%S"),
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Method;
    use crate::outcome::{Classification, ResponseStatus};
    use serde_json::json;

    fn make_record(response: serde_json::Value) -> OutcomeRecord {
        OutcomeRecord {
            endpoint: "current-time".into(),
            url: "http://example.com/app/getCurrTime.htm".into(),
            method: Method::Get,
            params: json!({}),
            data: json!({}),
            status: ResponseStatus::Code(500),
            response,
            elapsed_ms: 42,
            classification: Classification::HttpStatus,
        }
    }

    #[test]
    fn test_append_writes_block_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RotatingFileSink::new(dir.path(), "api-error");

        sink.append(&make_record(json!({"status": 0}))).unwrap();

        let content = std::fs::read_to_string(sink.active_path()).unwrap();
        assert!(content.contains("接口名称: current-time"));
        assert!(content.contains("接口地址: http://example.com/app/getCurrTime.htm"));
        assert!(content.contains("请求方法: GET"));
        assert!(content.contains("HTTP状态: 500"));
        assert!(content.contains("耗时: 42ms"));
        assert!(content.contains("错误类型: http-status"));
        assert!(content.contains("-----------------------------"));
    }

    #[test]
    fn test_no_response_sentinel_in_block() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RotatingFileSink::new(dir.path(), "api-error");

        let mut record = make_record(json!("connection refused"));
        record.status = ResponseStatus::NoResponse;
        record.classification = Classification::TransportError;
        sink.append(&record).unwrap();

        let content = std::fs::read_to_string(sink.active_path()).unwrap();
        assert!(content.contains("HTTP状态: NO_RESPONSE"));
        assert!(content.contains("错误类型: transport-error"));
    }

    #[test]
    fn test_index_zero_omitted_in_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RotatingFileSink::new(dir.path(), "api-error");

        let name = sink.active_path();
        let name = name.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("api-error-"));
        assert!(name.ends_with(".log"));
        // base (1 dash) + run stamp (1 dash) and no "-<index>" suffix.
        assert_eq!(name.matches('-').count(), 3);
    }

    #[test]
    fn test_rotation_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RotatingFileSink::new(dir.path(), "api-error").with_max_size(64);

        // First append lands in the index-0 file regardless of record size:
        // the check runs before the write, against the size as of the last
        // check.
        let big = make_record(json!({"payload": "x".repeat(512)}));
        sink.append(&big).unwrap();
        let first = sink.active_path();
        assert!(first.exists());

        // The index-0 file is now oversized, so the next append rotates.
        sink.append(&big).unwrap();
        let second = sink.active_path();
        assert_ne!(first, second);
        assert!(second.to_str().unwrap().ends_with("-1.log"));

        // And again: the suffix only ever grows, never back to 0.
        sink.append(&big).unwrap();
        let third = sink.active_path();
        assert!(third.to_str().unwrap().ends_with("-2.log"));
        assert!(first.exists() && second.exists() && third.exists());
    }

    #[test]
    fn test_small_records_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RotatingFileSink::new(dir.path(), "api-error");

        sink.append(&make_record(json!({"status": 0}))).unwrap();
        sink.append(&make_record(json!({"status": 0}))).unwrap();

        let files = sink.written_paths();
        assert_eq!(files.len(), 1);
        let content = std::fs::read_to_string(&files[0]).unwrap();
        assert_eq!(content.matches("接口名称:").count(), 2);
    }
}
