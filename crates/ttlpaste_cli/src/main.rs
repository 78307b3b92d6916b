//! Command-line client for the ttlpaste API.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::Value;
use std::io::{self, Read};
use std::time::{Duration, Instant};
use ttlpaste_core::DEFAULT_CLI_SERVER_URL;

#[derive(Parser)]
#[command(name = "tpaste", about = "ttlpaste CLI", version)]
struct Cli {
    /// Server URL (can also be set via TPASTE_SERVER env var)
    #[arg(short, long, env = "TPASTE_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Create a paste from a file or stdin
    New {
        #[arg(short, long)]
        file: Option<String>,
        /// Seconds until the paste expires
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        ttl: Option<u64>,
        /// Number of views before the paste is gone
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        max_views: Option<u64>,
    },
    /// Fetch a paste (consumes one view)
    Get { id: String },
    /// Check that the server and its store are up
    Health,
}

fn log_timing(timing: bool, label: &str, request: Duration, parse: Duration) {
    if !timing {
        return;
    }
    let total = request + parse;
    eprintln!(
        "[timing] {}: request {:.1} ms, parse {:.1} ms, total {:.1} ms",
        label,
        request.as_secs_f64() * 1000.0,
        parse.as_secs_f64() * 1000.0,
        total.as_secs_f64() * 1000.0
    );
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

async fn ensure_success_or_exit(res: reqwest::Response, action: &str) -> reqwest::Response {
    let status = res.status();
    if status.is_success() {
        return res;
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    eprintln!("{} failed ({}): {}", action, status, message);
    std::process::exit(1);
}

fn create_body(content: String, ttl: Option<u64>, max_views: Option<u64>) -> Value {
    let mut body = serde_json::json!({ "content": content });
    if let Some(ttl) = ttl {
        body["ttl_seconds"] = ttl.into();
    }
    if let Some(max_views) = max_views {
        body["max_views"] = max_views.into();
    }
    body
}

fn pretty(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("response encoding error: {}", err))
}

fn format_created_output(created: &Value, json: bool) -> Result<String, String> {
    if json {
        return pretty(created);
    }

    let id = created.get("id").and_then(Value::as_str);
    let url = created.get("url").and_then(Value::as_str);
    match (id, url) {
        (Some(id), Some(url)) => Ok(format!("Created {}: {}", id, url)),
        _ => Err("response missing 'id' or 'url' field".to_string()),
    }
}

fn format_view_output(view: &Value, json: bool) -> Result<String, String> {
    if json {
        return pretty(view);
    }

    view.get("content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "response missing 'content' field".to_string())
}

/// Lifecycle summary printed to stderr after plain-text content.
fn view_footer(view: &Value) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(remaining) = view.get("remaining_views").and_then(Value::as_i64) {
        parts.push(format!("{} view(s) left", remaining));
    }
    if let Some(expires_at) = view.get("expires_at").and_then(Value::as_str) {
        parts.push(format!("expires {}", expires_at));
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("[{}]", parts.join(", ")))
    }
}

fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn api_url_or_exit(server: &str, action: &str, segments: &[&str]) -> reqwest::Url {
    match api_url(server, segments) {
        Ok(url) => url,
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}

fn output_or_exit(result: Result<String, String>, action: &str) -> String {
    match result {
        Ok(output) => output,
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn resolve_server(server: Option<String>) -> String {
    server
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn read_content(file: Option<String>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        server,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    let server = normalize_server(resolve_server(server));

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::New {
            file,
            ttl,
            max_views,
        } => {
            let endpoint = api_url_or_exit(&server, "New", &["api", "pastes"]);
            let body = create_body(read_content(file)?, ttl, max_views);

            let request_start = Instant::now();
            let res = client.post(endpoint).json(&body).send().await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "New").await;

            let parse_start = Instant::now();
            let created: Value = res.json().await?;
            log_timing(timing, "new", request_elapsed, parse_start.elapsed());

            println!("{}", output_or_exit(format_created_output(&created, json), "New"));
        }
        Commands::Get { id } => {
            let endpoint = api_url_or_exit(&server, "Get", &["api", "pastes", id.as_str()]);
            let request_start = Instant::now();
            let res = client.get(endpoint).send().await?;
            let request_elapsed = request_start.elapsed();
            let res = ensure_success_or_exit(res, "Get").await;

            let parse_start = Instant::now();
            let view: Value = res.json().await?;
            log_timing(timing, "get", request_elapsed, parse_start.elapsed());

            println!("{}", output_or_exit(format_view_output(&view, json), "Get"));
            if !json {
                if let Some(footer) = view_footer(&view) {
                    eprintln!("{}", footer);
                }
            }
        }
        Commands::Health => {
            let endpoint = api_url_or_exit(&server, "Health", &["api", "healthz"]);
            let request_start = Instant::now();
            let res = client.get(endpoint).send().await?;
            let request_elapsed = request_start.elapsed();
            let status = res.status();

            let parse_start = Instant::now();
            let report: Value = res.json().await?;
            log_timing(timing, "health", request_elapsed, parse_start.elapsed());

            let ok = report.get("ok").and_then(Value::as_bool).unwrap_or(false);
            if json {
                println!("{}", output_or_exit(pretty(&report), "Health"));
            } else if ok {
                println!("ok");
            } else {
                eprintln!("Health failed ({}): store unavailable", status);
            }
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
