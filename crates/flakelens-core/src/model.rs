//! Aggregated test-run records as written by the reporter plugin.
//!
//! Field names follow the reporter's JSON (camelCase). Everything here is
//! read-only input for the diagnosis engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    Passed,
    Failed,
    TimedOut,
    Skipped,
    Interrupted,
}

impl TestStatus {
    pub fn is_passed(self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    /// Failed or timed out. Skipped and interrupted attempts are neither.
    pub fn is_failure(self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::TimedOut)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::TimedOut => "timedOut",
            TestStatus::Skipped => "skipped",
            TestStatus::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown Error";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Short type/value label reported by the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl TestError {
    pub fn message_or_unknown(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(UNKNOWN_ERROR_MESSAGE)
    }
}

/// One stdout/stderr chunk: plain text, or a byte buffer serialized as
/// `{"type": "Buffer", "data": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsoleChunk {
    Text(String),
    Buffer(BufferChunk),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferChunk {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<u8>,
}

impl ConsoleChunk {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConsoleChunk::Text(s) => Some(s),
            ConsoleChunk::Buffer(_) => None,
        }
    }

    /// Text content, with buffers decoded as lossy UTF-8.
    pub fn to_lossy_string(&self) -> String {
        match self {
            ConsoleChunk::Text(s) => s.clone(),
            ConsoleChunk::Buffer(b) => String::from_utf8_lossy(&b.data).into_owned(),
        }
    }
}

impl From<&str> for ConsoleChunk {
    fn from(s: &str) -> Self {
        ConsoleChunk::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Attachment {
    pub fn new(name: &str, content_type: &str, path: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            path: path.map(str::to_string),
        }
    }
}

/// One execution (retry) of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAttempt {
    pub attempt: u32,
    pub status: TestStatus,
    /// Milliseconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TestError>,
    #[serde(default)]
    pub stdout: Vec<ConsoleChunk>,
    #[serde(default)]
    pub stderr: Vec<ConsoleChunk>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl RunAttempt {
    pub fn new(attempt: u32, status: TestStatus, duration: f64) -> Self {
        Self {
            attempt,
            status,
            duration,
            error: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error = Some(TestError {
            message: Some(message.to_string()),
            ..TestError::default()
        });
        self
    }

    pub fn with_stdout(mut self, chunk: &str) -> Self {
        self.stdout.push(chunk.into());
        self
    }

    pub fn with_stderr(mut self, chunk: &str) -> Self {
        self.stderr.push(chunk.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// stdout chunks followed by stderr chunks.
    pub fn console_chunks(&self) -> impl Iterator<Item = &ConsoleChunk> {
        self.stdout.iter().chain(self.stderr.iter())
    }
}

/// All attempts of one test, grouped by test identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedTestResult {
    pub id: String,
    pub title: String,
    pub location: String,
    pub final_status: TestStatus,
    pub is_flaky: bool,
    #[serde(default)]
    pub attempts: Vec<RunAttempt>,
}

impl AggregatedTestResult {
    pub fn passed_attempts(&self) -> Vec<&RunAttempt> {
        self.attempts.iter().filter(|a| a.status.is_passed()).collect()
    }

    pub fn failed_attempts(&self) -> Vec<&RunAttempt> {
        self.attempts
            .iter()
            .filter(|a| a.status.is_failure())
            .collect()
    }
}
