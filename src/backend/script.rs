// src/backend/script.rs
//
// Child-process TypeScript analyzer: source code goes in on stdin, exactly
// one line of JSON comes back on stdout. The child is killed once the
// timeout budget is spent.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::analyzer::AnalysisResult;
use crate::backend::{AnalyzerBackend, BackendError};

const BACKEND: &str = "typescript";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct ScriptBackend {
    interpreter: String,
    script: PathBuf,
    timeout: Duration,
}

impl ScriptBackend {
    pub fn new(interpreter: &str, script: &Path, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            script: script.to_path_buf(),
            timeout,
        }
    }

    pub fn script_path(&self) -> &Path {
        &self.script
    }
}

impl AnalyzerBackend for ScriptBackend {
    fn id(&self) -> &'static str {
        BACKEND
    }

    fn analyze(&self, code: &str) -> Result<AnalysisResult, BackendError> {
        if !self.script.exists() {
            return Err(BackendError::Unreachable {
                backend: BACKEND,
                detail: format!("analyzer script not found at {}", self.script.display()),
            });
        }

        let mut child = Command::new(&self.interpreter)
            .arg(&self.script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BackendError::Unreachable {
                backend: BACKEND,
                detail: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(code.as_bytes()) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackendError::Unreachable {
                    backend: BACKEND,
                    detail: format!("failed to deliver source on stdin: {}", e),
                });
            }
            // dropping the handle closes the pipe so the child sees EOF
        }

        let start = Instant::now();

        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(BackendError::Timeout {
                            backend: BACKEND,
                            secs: self.timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(BackendError::Unreachable {
                        backend: BACKEND,
                        detail: e.to_string(),
                    })
                }
            }
        }

        let out = child
            .wait_with_output()
            .map_err(|e| BackendError::Unreachable {
                backend: BACKEND,
                detail: e.to_string(),
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let detail = match stderr.trim() {
                "" => format!("exit code {}", out.status.code().unwrap_or(-1)),
                msg => truncate(msg, 500),
            };
            return Err(BackendError::Failed {
                backend: BACKEND,
                detail,
            });
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        let line = stdout
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or(BackendError::EmptyResponse { backend: BACKEND })?;

        serde_json::from_str(line).map_err(|e| BackendError::MalformedResponse {
            backend: BACKEND,
            detail: e.to_string(),
        })
    }
}

fn truncate(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        s.to_string()
    } else {
        let head: String = s.chars().take(n).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_script_is_unreachable() {
        let b = ScriptBackend::new(
            "node",
            Path::new("/definitely/not/here/analyzer.js"),
            Duration::from_secs(1),
        );
        let err = b.analyze("const x = 1;").unwrap_err();
        assert!(matches!(err, BackendError::Unreachable { .. }));
    }

    #[test]
    fn single_json_line_round_trip() {
        // a stand-in "analyzer" that echoes a fixed result for any stdin
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("analyzer.sh");
        fs::write(
            &script,
            "cat > /dev/null\necho '{\"language\":\"typescript\",\"complexity\":3,\"branches\":2}'\n",
        )
        .unwrap();

        let b = ScriptBackend::new("sh", &script, Duration::from_secs(5));
        let result = b.analyze("function f() {}").unwrap();
        assert_eq!(result.complexity, 3);
        assert_eq!(result.branches, 2);
    }

    #[test]
    fn silent_success_is_empty_response() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("analyzer.sh");
        fs::write(&script, "cat > /dev/null\n").unwrap();

        let b = ScriptBackend::new("sh", &script, Duration::from_secs(5));
        let err = b.analyze("function f() {}").unwrap_err();
        assert!(matches!(err, BackendError::EmptyResponse { .. }));
    }

    #[test]
    fn garbage_output_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("analyzer.sh");
        fs::write(&script, "cat > /dev/null\necho 'not json'\n").unwrap();

        let b = ScriptBackend::new("sh", &script, Duration::from_secs(5));
        let err = b.analyze("function f() {}").unwrap_err();
        assert!(matches!(err, BackendError::MalformedResponse { .. }));
    }

    #[test]
    fn nonzero_exit_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("analyzer.sh");
        fs::write(&script, "cat > /dev/null\necho 'boom' >&2\nexit 3\n").unwrap();

        let b = ScriptBackend::new("sh", &script, Duration::from_secs(5));
        let err = b.analyze("function f() {}").unwrap_err();
        match err {
            BackendError::Failed { detail, .. } => assert!(detail.contains("boom")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn hung_child_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("analyzer.sh");
        fs::write(&script, "sleep 30\n").unwrap();

        let b = ScriptBackend::new("sh", &script, Duration::from_millis(300));
        let err = b.analyze("function f() {}").unwrap_err();
        assert!(matches!(err, BackendError::Timeout { .. }));
    }
}
