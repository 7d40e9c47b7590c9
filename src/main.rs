// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Domari CLI - Dynamic DOM XSS Scanner
//!
//! Scans one target URL per invocation. Interrupting the scan with ctrl-c
//! stops at the next parameter boundary and still prints the summary of
//! everything found so far.

use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use url::Url;

use domari::{CookiePair, HttpDriver, Marker, PayloadSet, ScanConfig, Scanner};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("domari {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let (url, config, payload_file) = match parse_args(&args[1..]) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}", message);
            print_usage();
            return ExitCode::from(1);
        }
    };

    // Initialize logging
    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("domari={}", default_level).parse().unwrap()),
        )
        .init();

    scan(url, config, payload_file).await
}

fn print_usage() {
    println!(
        r#"Domari - Dynamic DOM XSS Scanner

USAGE:
    domari <url> [OPTIONS]

OPTIONS:
    -g, --guess             Guess parameters from input fields and runtime hooks
    -G, --guess-extended    Also guess from script variables and the wordlist
    -i, --interactive       Pause after each payload; press enter to continue
    -x, --exclude <name>    Never scan this parameter (repeatable)
    -X, --exclude-console <text>
                            Ignore console messages containing this text (repeatable)
    -p, --payloads <file>   Load payload templates from a JSON array file
    -c, --cookie <n=v>      Seed a cookie before scanning (repeatable)
    -a, --user-agent <ua>   Override the user agent
    --proxy <url>           Route traffic through an HTTP proxy
    -V, --verbose           Verbose logging of signals and navigations
    help                    Show this help message
    version                 Show version information

EXAMPLES:
    domari "https://example.com/search?q=hello"
    domari "https://example.com/app#/path?ref=home" -g
    domari "https://example.com/page?id=1" -x id -c "session=abc123"
"#
    );
}

type ParsedArgs = (Url, ScanConfig, Option<String>);

fn parse_args(args: &[String]) -> Result<ParsedArgs, String> {
    let url = Url::parse(&args[0]).map_err(|e| format!("Invalid URL '{}': {}", args[0], e))?;

    let mut config = ScanConfig::new();
    let mut payload_file = None;

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-g" | "--guess" => config = config.guess_parameters(true),
            "-G" | "--guess-extended" => config = config.guess_parameters_extended(true),
            "-i" | "--interactive" => config = config.interactive(true),
            "-V" | "--verbose" => config = config.verbose(true),
            "-x" | "--exclude" => {
                let name = iter.next().ok_or("Missing value for --exclude")?;
                config = config.exclude_parameter(name.as_str());
            }
            "-X" | "--exclude-console" => {
                let text = iter.next().ok_or("Missing value for --exclude-console")?;
                config = config.exclude_console(text.as_str());
            }
            "-p" | "--payloads" => {
                let file = iter.next().ok_or("Missing value for --payloads")?;
                payload_file = Some(file.clone());
            }
            "-c" | "--cookie" => {
                let raw = iter.next().ok_or("Missing value for --cookie")?;
                let cookie = CookiePair::parse(raw).map_err(|e| e.to_string())?;
                config = config.cookie(cookie);
            }
            "-a" | "--user-agent" => {
                let ua = iter.next().ok_or("Missing value for --user-agent")?;
                config = config.user_agent(ua.as_str());
            }
            "--proxy" => {
                let proxy = iter.next().ok_or("Missing value for --proxy")?;
                config = config.proxy(proxy.as_str());
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok((url, config, payload_file))
}

async fn scan(url: Url, config: ScanConfig, payload_file: Option<String>) -> ExitCode {
    let interactive = config.interactive;

    let driver = match HttpDriver::new(&config) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            eprintln!("Failed to create driver: {}", e);
            return ExitCode::from(1);
        }
    };

    let mut scanner = match Scanner::new(driver, url, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(file) = payload_file {
        let marker = Marker::generate();
        match PayloadSet::from_json_file(Path::new(&file), &marker) {
            Ok(payloads) => scanner = scanner.with_marker(marker).with_payloads(payloads),
            Err(e) => {
                eprintln!("Failed to load payloads from {}: {}", file, e);
                return ExitCode::from(1);
            }
        }
    }

    // Interactive mode: a line on stdin is the continue signal
    if interactive {
        let (tx, rx) = mpsc::channel(1);
        scanner = scanner.with_resume(rx);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(_)) = lines.next_line().await {
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
    }

    // Ctrl-c stops at the next parameter boundary; the summary still runs
    let abort = scanner.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted - finishing current parameter, then summarizing");
            abort.store(true, Ordering::Relaxed);
        }
    });

    match scanner.run().await {
        Ok(report) => {
            println!("{}", report.summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Scan failed: {}", e);
            ExitCode::from(1)
        }
    }
}
