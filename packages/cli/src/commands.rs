//! Command definitions and execution.
//!
//! Every command becomes one `HttpRequest` handled by a `ConfigEndpoint`,
//! so the CLI sees exactly what an HTTP caller would.

use std::io::Read;

use clap::Subcommand;
use nu_ansi_term::Color;
use serde_json::Value as JsonValue;

use confentry_core::Backend;
use confentry_http::{ConfigEndpoint, HttpRequest, HttpResponse};
use confentry_serde::JsonCodec;

use crate::error::CliError;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print one entry as JSON
    Read { kind: String, name: String },
    /// Print every entry of a kind as a JSON array
    List { kind: String },
    /// Delete an entry
    Delete { kind: String, name: String },
    /// Create or replace an entry from a JSON file, or `-` for stdin
    Write { file: String },
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Command succeeded, with output to display
    Ok(String),
    /// The requested entry does not exist
    NotFound(String),
    /// The endpoint rejected the request
    Error(String),
}

impl CommandResult {
    /// Process exit code for this result.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandResult::Ok(_) => 0,
            CommandResult::NotFound(_) | CommandResult::Error(_) => 1,
        }
    }
}

/// Execute a command against an endpoint. `stdin` is read only by `write -`.
pub fn execute<B: Backend>(
    endpoint: &ConfigEndpoint<B>,
    command: &Command,
    stdin: impl Read,
) -> Result<CommandResult, CliError> {
    let prefix = &endpoint.config().prefix;

    match command {
        Command::Read { kind, name } => {
            let response = endpoint.handle(&HttpRequest::get(format!("{}/{}/{}", prefix, kind, name)));
            if !response.is_success() {
                return Ok(failure(&response));
            }
            match entries(&response).first() {
                Some(entry) => Ok(CommandResult::Ok(pretty(entry))),
                None => Ok(CommandResult::NotFound(format!(
                    "Config entry not found for {:?} / {:?}",
                    kind, name
                ))),
            }
        }
        Command::List { kind } => {
            let response = endpoint.handle(&HttpRequest::get(format!("{}/{}", prefix, kind)));
            if !response.is_success() {
                return Ok(failure(&response));
            }
            Ok(CommandResult::Ok(pretty(&JsonValue::Array(entries(&response)))))
        }
        Command::Delete { kind, name } => {
            let response =
                endpoint.handle(&HttpRequest::delete(format!("{}/{}/{}", prefix, kind, name)));
            if !response.is_success() {
                return Ok(failure(&response));
            }
            Ok(CommandResult::Ok(format!(
                "Config entry deleted: {}/{}",
                kind, name
            )))
        }
        Command::Write { file } => {
            let body = read_payload(file, stdin)?;
            let response = endpoint.handle(&HttpRequest::put(prefix.clone()).with_raw_body(body.clone()));
            if !response.is_success() {
                return Ok(failure(&response));
            }
            let written = JsonCodec
                .decode_entry(body.as_bytes())
                .map(|entry| format!("{}/{}", entry.kind(), entry.name()))
                .unwrap_or_default();
            Ok(CommandResult::Ok(format!("Config entry written: {}", written)))
        }
    }
}

/// Render a result for the terminal.
pub fn format_result(result: &CommandResult) -> String {
    match result {
        CommandResult::Ok(display) => display.clone(),
        CommandResult::NotFound(message) => Color::Yellow.paint(message).to_string(),
        CommandResult::Error(message) => {
            format!("{} {}", Color::Red.bold().paint("Error:"), message)
        }
    }
}

fn read_payload(file: &str, mut stdin: impl Read) -> Result<String, CliError> {
    if file == "-" {
        let mut body = String::new();
        stdin.read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(file)?)
    }
}

fn entries(response: &HttpResponse) -> Vec<JsonValue> {
    response.body["Entries"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

fn failure(response: &HttpResponse) -> CommandResult {
    CommandResult::Error(format!(
        "Unexpected response code: {} ({})",
        response.status,
        response.body_str().trim()
    ))
}

fn pretty(value: &JsonValue) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
