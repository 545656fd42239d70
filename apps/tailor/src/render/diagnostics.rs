// Compiler log scraping. Only lines carrying an error marker are returned so
// error payloads stay small.

use std::path::Path;
use std::process::Output;

use tracing::debug;

/// Lines of process output kept when the log yields nothing.
const OUTPUT_TAIL_LINES: usize = 10;

/// Log lines containing `!` or `Error`, trimmed.
pub fn error_lines(log: &str) -> Vec<String> {
    log.lines()
        .filter(|line| line.contains('!') || line.contains("Error"))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Exit status plus the tail of stderr (stdout when stderr is empty).
pub fn process_failure(output: &Output) -> Vec<String> {
    let mut details = vec![format!("compiler {}", output.status)];

    let stream = if output.stderr.iter().any(|b| !b.is_ascii_whitespace()) {
        &output.stderr
    } else {
        &output.stdout
    };
    let text = String::from_utf8_lossy(stream);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    details.extend(lines[start..].iter().map(|l| l.trim().to_string()));

    details
}

/// Diagnostics for a failed run: error lines from `log_path`, falling back to
/// the process output when the log is unreadable or has no marker.
pub async fn collect(log_path: &Path, output: &Output) -> Vec<String> {
    match tokio::fs::read(log_path).await {
        Ok(bytes) => {
            // TeX logs are not guaranteed to be UTF-8.
            let lines = error_lines(&String::from_utf8_lossy(&bytes));
            if !lines.is_empty() {
                return lines;
            }
            debug!("{} has no error lines", log_path.display());
        }
        Err(e) => debug!("Could not read {}: {e}", log_path.display()),
    }
    process_failure(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    const LOG: &str = "This is pdfTeX, Version 3.141592653\n\
        (./resume.tex\n\
        LaTeX2e <2020-02-02>\n\
        ! Missing } inserted.\n\
        <inserted text>\n\
        l.12 \\end{document}\n\
        ! Emergency stop.\n\
        No pages of output.\n";

    fn output(code: i32, stdout: &str, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_error_lines_keeps_only_marked_lines() {
        assert_eq!(
            error_lines(LOG),
            vec!["! Missing } inserted.", "! Emergency stop."]
        );
    }

    #[test]
    fn test_error_lines_matches_error_word() {
        let log = "ok\n  LaTeX Error: File `foo.sty' not found.  \nok";
        assert_eq!(error_lines(log), vec!["LaTeX Error: File `foo.sty' not found."]);
    }

    #[test]
    fn test_process_failure_prefers_stderr_tail() {
        let stderr: String = (1..=15).map(|i| format!("line {i}\n")).collect();
        let details = process_failure(&output(1, "ignored", &stderr));
        assert_eq!(details[0], "compiler exit status: 1");
        assert_eq!(details.len(), 1 + OUTPUT_TAIL_LINES);
        assert_eq!(details.last().map(String::as_str), Some("line 15"));
    }

    #[test]
    fn test_process_failure_uses_stdout_when_stderr_blank() {
        let details = process_failure(&output(2, "fatal: no input\n", "  \n"));
        assert_eq!(details, vec!["compiler exit status: 2", "fatal: no input"]);
    }

    #[tokio::test]
    async fn test_collect_falls_back_when_log_missing() {
        let dir = tempfile::tempdir().unwrap();
        let details = collect(&dir.path().join("resume.log"), &output(1, "", "boom")).await;
        assert_eq!(details, vec!["compiler exit status: 1", "boom"]);
    }

    #[tokio::test]
    async fn test_collect_reads_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.log");
        std::fs::write(&path, LOG).unwrap();
        let details = collect(&path, &output(1, "", "boom")).await;
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|l| l.contains('!')));
    }
}
