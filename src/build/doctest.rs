//! Shell doctests embedded in pages.
//!
//! A fenced block tagged `doctest` holds one or more commands, each on a
//! line starting with `$ `, followed by the output it is expected to print:
//!
//! ````markdown
//! ```doctest
//! $ echo hello
//! hello
//! ```
//! ````

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use super::capture;

const DOCTEST_TAG: &str = "doctest";
const PROMPT: &str = "$ ";

/// One command and its expected output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctest {
    pub command: String,
    pub expected: String,
}

/// A doctest whose output did not match.
#[derive(Debug, Clone)]
pub struct DoctestFailure {
    pub page: PathBuf,
    pub command: String,
    pub expected: String,
    pub actual: String,
    pub status: Option<i32>,
}

impl fmt::Display for DoctestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: `{}` (exit {}) expected {:?}, got {:?}",
            self.page.display(),
            self.command,
            self.status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            self.expected,
            self.actual
        )
    }
}

/// Extract every doctest from a markdown document, in document order.
pub fn extract_doctests(markdown: &str) -> Vec<Doctest> {
    let mut tests = Vec::new();
    let mut block: Option<String> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if info.split_whitespace().next() == Some(DOCTEST_TAG) =>
            {
                block = Some(String::new());
            }
            Event::Text(text) => {
                if let Some(body) = block.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(body) = block.take() {
                    tests.extend(parse_block(&body));
                }
            }
            _ => {}
        }
    }

    tests
}

fn parse_block(body: &str) -> Vec<Doctest> {
    let mut tests: Vec<Doctest> = Vec::new();

    for line in body.lines() {
        if let Some(command) = line.strip_prefix(PROMPT) {
            tests.push(Doctest {
                command: command.to_string(),
                expected: String::new(),
            });
        } else if let Some(current) = tests.last_mut() {
            if !current.expected.is_empty() {
                current.expected.push('\n');
            }
            current.expected.push_str(line);
        }
    }

    for test in &mut tests {
        test.expected = normalize(&test.expected);
    }
    tests
}

/// Trim trailing whitespace on every line and at the end.
fn normalize(output: &str) -> String {
    output
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Run one doctest with `sh -c` in `working_dir`.
///
/// Command output is emitted through the active output capture.
pub fn run_doctest(
    test: &Doctest,
    page: &Path,
    working_dir: &Path,
) -> std::io::Result<Option<DoctestFailure>> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(&test.command)
        .current_dir(working_dir)
        .output()?;

    capture::emit(&output.stdout);
    capture::emit(&output.stderr);

    let actual = normalize(&String::from_utf8_lossy(&output.stdout));
    if output.status.success() && actual == test.expected {
        return Ok(None);
    }

    Ok(Some(DoctestFailure {
        page: page.to_path_buf(),
        command: test.command.clone(),
        expected: test.expected.clone(),
        actual,
        status: output.status.code(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_doctests() {
        let markdown = "# Usage\n\n```doctest\n$ echo one\none\n$ printf 'a\\nb\\n'\na  \nb\n```\n\n```sh\n$ echo ignored\n```\n";
        let tests = extract_doctests(markdown);
        assert_eq!(
            tests,
            vec![
                Doctest {
                    command: "echo one".to_string(),
                    expected: "one".to_string(),
                },
                Doctest {
                    command: "printf 'a\\nb\\n'".to_string(),
                    expected: "a\nb".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_lines_before_first_prompt_are_ignored() {
        let tests = extract_doctests("```doctest\nnoise\n$ true\n```\n");
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].expected, "");
    }

    #[test]
    fn test_run_passing_doctest() {
        let _guard = capture::serial();
        let dir = tempfile::TempDir::new().unwrap();
        let test = Doctest {
            command: "echo hello".to_string(),
            expected: "hello".to_string(),
        };
        let capture = capture::OutputCapture::acquire().unwrap();
        let result = run_doctest(&test, Path::new("index.md"), dir.path()).unwrap();
        assert!(result.is_none());
        assert_eq!(capture.release(), "hello\n");
    }

    #[test]
    fn test_run_failing_doctest() {
        let _guard = capture::serial();
        let dir = tempfile::TempDir::new().unwrap();
        let test = Doctest {
            command: "echo goodbye".to_string(),
            expected: "hello".to_string(),
        };
        let capture = capture::OutputCapture::acquire().unwrap();
        let failure = run_doctest(&test, Path::new("index.md"), dir.path())
            .unwrap()
            .unwrap();
        capture.release();

        assert_eq!(failure.actual, "goodbye");
        assert_eq!(failure.status, Some(0));
        assert!(failure.to_string().contains("index.md"));
    }

    #[test]
    fn test_nonzero_exit_fails() {
        let _guard = capture::serial();
        let dir = tempfile::TempDir::new().unwrap();
        let test = Doctest {
            command: "exit 3".to_string(),
            expected: String::new(),
        };
        let capture = capture::OutputCapture::acquire().unwrap();
        let failure = run_doctest(&test, Path::new("index.md"), dir.path())
            .unwrap()
            .unwrap();
        capture.release();
        assert_eq!(failure.status, Some(3));
    }
}
