//! Command-line interface for mathlingua.
//!
//! Usage:
//!   mlg check [paths…] [--json] [--debug]  - Parse `.math` files and report diagnostics
//!   mlg doc                                - Render `.math` files under the working directory to HTML
//!   mlg view <path>                        - Open an interactive pager over one file's text
//!   mlg version                            - Print the version

use clap::{Arg, Command};
use mathlingua::diagnostics::{Diagnostic, Severity};
use mathlingua::phase4::writer::{write_root, HtmlCodeWriter, TextCodeWriter};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::try_init().ok();

    let matches = Command::new("mlg")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A front-end compiler for the MathLingua mathematical knowledge language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check")
                .about("Parse .math files and report diagnostics")
                .arg(Arg::new("paths").help("Files or directories to check").num_args(0..))
                .arg(Arg::new("json").long("json").help("Emit diagnostics as JSON").num_args(0))
                .arg(Arg::new("debug").long("debug").help("Include the reporting phase in output").num_args(0)),
        )
        .subcommand(Command::new("doc").about("Render .math files under the working directory to HTML"))
        .subcommand(
            Command::new("view")
                .about("Open an interactive pager over one file's text")
                .arg(Arg::new("path").help("Path to the .math file to view").required(true).index(1)),
        )
        .subcommand(Command::new("version").about("Print the version"))
        .get_matches();

    match matches.subcommand() {
        Some(("check", check_matches)) => {
            let paths: Vec<&str> = check_matches.get_many::<String>("paths").map(|v| v.map(String::as_str).collect()).unwrap_or_default();
            let paths = if paths.is_empty() { vec!["."] } else { paths };
            let json = check_matches.get_flag("json");
            let debug = check_matches.get_flag("debug");
            handle_check_command(&paths, json, debug)
        }
        Some(("doc", _)) => handle_doc_command(),
        Some(("view", view_matches)) => {
            let path = view_matches.get_one::<String>("path").unwrap();
            handle_view_command(path)
        }
        Some(("version", _)) => {
            println!("mlg {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => unreachable!(),
    }
}

#[derive(Serialize)]
struct DiagnosticJson {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    message: String,
    #[serde(rename = "debugInfo")]
    debug_info: String,
    row: usize,
    column: usize,
}

#[derive(Serialize)]
struct CheckReport {
    diagnostics: Vec<DiagnosticJson>,
}

fn to_json(diagnostic: &Diagnostic, debug: bool) -> DiagnosticJson {
    DiagnosticJson {
        kind: diagnostic.severity.to_string(),
        path: diagnostic.path.clone(),
        message: diagnostic.message.clone(),
        debug_info: if debug { diagnostic.origin.to_string() } else { String::new() },
        row: diagnostic.range.start.line,
        column: diagnostic.range.start.column,
    }
}

fn handle_check_command(paths: &[&str], json: bool, debug: bool) -> ExitCode {
    let mut files = Vec::new();
    for path in paths {
        collect_math_files(Path::new(path), &mut files);
    }
    files.sort();

    let mut all_diagnostics = Vec::new();
    for file in &files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("could not read {}: {err}", file.display());
                continue;
            }
        };
        let path = file.to_string_lossy().to_string();
        let (_document, diagnostics) = mathlingua::parse(&source, &path);
        all_diagnostics.extend(diagnostics);
    }

    let has_errors = all_diagnostics.iter().any(|d| d.severity == Severity::Error);

    if json {
        let report = CheckReport { diagnostics: all_diagnostics.iter().map(|d| to_json(d, debug)).collect() };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("failed to serialise diagnostics: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for diagnostic in &all_diagnostics {
            println!(
                "{} [{}] {}:{}:{}: {}",
                diagnostic.severity,
                diagnostic.origin,
                diagnostic.path,
                diagnostic.range.start.line + 1,
                diagnostic.range.start.column + 1,
                diagnostic.message,
            );
        }
        println!("{} file(s) checked, {} diagnostic(s)", files.len(), all_diagnostics.len());
    }

    if has_errors { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn collect_math_files(path: &Path, out: &mut Vec<PathBuf>) {
    if path.is_file() {
        if path.extension().is_some_and(|ext| ext == "math") {
            out.push(path.to_path_buf());
        }
        return;
    }
    let Ok(entries) = fs::read_dir(path) else {
        return;
    };
    for entry in entries.flatten() {
        collect_math_files(&entry.path(), out);
    }
}

fn handle_doc_command() -> ExitCode {
    let mut files = Vec::new();
    collect_math_files(Path::new("."), &mut files);
    files.sort();

    for file in &files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("could not read {}: {err}", file.display());
                continue;
            }
        };
        let path = file.to_string_lossy().to_string();
        let (root, diagnostics) = mathlingua::parse_structural(&source, &path);
        let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);

        let html = if has_errors {
            let mut body = String::from("<pre>");
            body.push_str(&html_escape(&source));
            body.push_str("</pre><ul>");
            for diagnostic in &diagnostics {
                body.push_str(&format!("<li>{}</li>", html_escape(&diagnostic.message)));
            }
            body.push_str("</ul>");
            body
        } else {
            write_root(&root, Box::new(HtmlCodeWriter::new()))
        };

        let out_path = Path::new("docs").join(format!("{}.html", file.display()));
        if let Some(parent) = out_path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!("could not create {}: {err}", parent.display());
                continue;
            }
        }
        if let Err(err) = fs::write(&out_path, html) {
            eprintln!("could not write {}: {err}", out_path.display());
        }
    }

    ExitCode::SUCCESS
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn handle_view_command(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("could not read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let (root, _diagnostics) = mathlingua::parse_structural(&source, path);
    let text = write_root(&root, Box::new(TextCodeWriter::new()));

    match pager::run(&text) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("viewer error: {err}");
            ExitCode::FAILURE
        }
    }
}

mod pager {
    use crossterm::event::{self, Event, KeyCode};
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
    use ratatui::backend::CrosstermBackend;
    use ratatui::layout::Rect;
    use ratatui::text::Text;
    use ratatui::widgets::{Paragraph, Wrap};
    use ratatui::Terminal;
    use std::io;

    /// Renders `text` in a scrollable full-screen pane; `q` or `Esc` exits.
    pub fn run(text: &str) -> io::Result<()> {
        enable_raw_mode()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let mut scroll: u16 = 0;
        let owned = Text::from(text.to_string());
        let result = run_loop(&mut terminal, &owned, &mut scroll);

        disable_raw_mode()?;
        terminal.clear()?;
        terminal.show_cursor()?;
        result
    }

    fn run_loop(
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        text: &Text,
        scroll: &mut u16,
    ) -> io::Result<()> {
        loop {
            terminal.draw(|frame| {
                let area: Rect = frame.area();
                let paragraph = Paragraph::new(text.clone()).wrap(Wrap { trim: false }).scroll((*scroll, 0));
                frame.render_widget(paragraph, area);
            })?;

            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
                    KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
                    KeyCode::PageDown => *scroll = scroll.saturating_add(20),
                    KeyCode::PageUp => *scroll = scroll.saturating_sub(20),
                    _ => {}
                }
            }
        }
    }
}
