//! Request script parsing and replay.

use std::io::{BufRead, Write};

use bytes::Bytes;
use http::{Method, Request};

use kvorm_core::RecordStore;
use kvorm_http::Server;

#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("line {line}: unknown method '{method}'")]
    InvalidMethod { line: usize, method: String },

    #[error("line {line}: missing request path")]
    MissingPath { line: usize },

    #[error("line {line}: invalid request: {source}")]
    InvalidRequest {
        line: usize,
        #[source]
        source: http::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One request from a script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub method: Method,
    pub path: String,
    pub body: Bytes,
}

impl ScriptLine {
    fn into_request(self, line: usize) -> Result<Request<Bytes>, ScriptError> {
        Request::builder()
            .method(self.method)
            .uri(self.path)
            .body(self.body)
            .map_err(|source| ScriptError::InvalidRequest { line, source })
    }
}

/// Parse `METHOD PATH [BODY]`. Blank lines and `#` comments yield `None`.
pub fn parse_line(text: &str, line: usize) -> Result<Option<ScriptLine>, ScriptError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let (method, rest) = split_word(text);
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
        ScriptError::InvalidMethod {
            line,
            method: method.to_string(),
        }
    })?;

    let (path, body) = split_word(rest);
    if path.is_empty() {
        return Err(ScriptError::MissingPath { line });
    }

    Ok(Some(ScriptLine {
        method,
        path: path.to_string(),
        body: Bytes::from(body.to_string()),
    }))
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (text, ""),
    }
}

/// Send one request and format the outcome as `STATUS BODY`.
pub fn execute<S: RecordStore>(
    server: &Server<S>,
    request: ScriptLine,
    line: usize,
) -> Result<String, ScriptError> {
    let response = server.handle(request.into_request(line)?);
    let status = response.status().as_u16();
    let body = String::from_utf8_lossy(response.body());
    let body = body.trim_end();
    if body.is_empty() {
        Ok(status.to_string())
    } else {
        Ok(format!("{} {}", status, body))
    }
}

/// Replay every request in `input`, writing one result line per request to
/// `output`. Malformed lines are reported in the output and skipped.
///
/// Returns the number of requests sent.
pub fn run_script<S, R, W>(
    server: &Server<S>,
    input: R,
    mut output: W,
) -> Result<usize, ScriptError>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
{
    let mut sent = 0;
    for (index, text) in input.lines().enumerate() {
        let text = text?;
        let line = index + 1;

        let result = parse_line(&text, line).and_then(|parsed| match parsed {
            Some(request) => execute(server, request, line).map(Some),
            None => Ok(None),
        });

        match result {
            Ok(Some(outcome)) => {
                sent += 1;
                writeln!(output, "{}", outcome)?;
            }
            Ok(None) => {}
            Err(ScriptError::Io(e)) => return Err(ScriptError::Io(e)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping script line");
                writeln!(output, "error: {}", e)?;
            }
        }
    }
    output.flush()?;
    Ok(sent)
}
