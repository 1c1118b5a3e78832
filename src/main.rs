//! Headless workspace driver: searches a directory tree through the
//! workspace session core and opens the first hit.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use zcode_workspace::kernel::services::adapters::{HeadlessEngine, LocalFileProvider, SettingsStore};
use zcode_workspace::kernel::services::ports::{FixedAnswer, SearchResult};
use zcode_workspace::kernel::{PaneId, SearchUpdate, Workspace, WorkspaceError, WorkspaceServices};

mod logging;

const USAGE: &str =
    "usage: zcode-workspace <root> <query> [--regex] [--case-sensitive] [--max N]";
const SEARCH_COMMAND: &str = "workspace.search";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    root: PathBuf,
    query: String,
    regex: bool,
    case_sensitive: bool,
    max_results: Option<usize>,
}

#[derive(Debug, PartialEq, Eq)]
enum ParseOutcome {
    Run(CliArgs),
    Help,
}

fn parse_args<I>(args: I) -> Result<ParseOutcome, String>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut regex = false;
    let mut case_sensitive = false;
    let mut max_results = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(ParseOutcome::Help),
            "--regex" => regex = true,
            "--case-sensitive" => case_sensitive = true,
            "--max" => {
                let value = args.next().ok_or("--max needs a value")?;
                let n = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --max value: {value}"))?;
                max_results = Some(n);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(root), Some(query), None) = (positional.next(), positional.next(), positional.next())
    else {
        return Err("expected <root> and <query>".to_string());
    };

    Ok(ParseOutcome::Run(CliArgs {
        root: PathBuf::from(root),
        query,
        regex,
        case_sensitive,
        max_results,
    }))
}

fn format_result(root: &Path, result: &SearchResult) -> String {
    let path = result.path.strip_prefix(root).unwrap_or(&result.path);
    let spans: Vec<String> = result
        .spans
        .iter()
        .map(|span| format!("{}-{}", span.start, span.end))
        .collect();
    format!("{}:{}: {}", path.display(), result.line, spans.join(","))
}

async fn run(args: CliArgs) -> Result<ExitCode, WorkspaceError> {
    let mut store = match SettingsStore::default_location() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "settings unavailable, using defaults");
            None
        }
    };
    let settings = store
        .as_ref()
        .map(|s| s.settings().clone())
        .unwrap_or_default();

    let root = std::fs::canonicalize(&args.root).map_err(|e| {
        WorkspaceError::InvalidPath(format!("{}: {e}", args.root.display()))
    })?;

    let services = WorkspaceServices {
        engine: Arc::new(HeadlessEngine::new()),
        files: Arc::new(LocalFileProvider::new()),
        prompt: Arc::new(FixedAnswer(false)),
        runtime: tokio::runtime::Handle::current(),
    };
    let mut workspace = Workspace::new(services, &settings);

    let mut request = workspace
        .search_request(&root, args.query)
        .regex(args.regex);
    if args.case_sensitive {
        request = request.case_sensitive(true);
    }
    if let Some(max) = args.max_results {
        request = request.max_results(max);
    }
    workspace.search(request)?;

    while let Some(update) = workspace.next_search_update().await {
        match update {
            SearchUpdate::Progress { results, .. } => {
                for result in &results {
                    println!("{}", format_result(&root, result));
                }
            }
            SearchUpdate::Finished(summary) => {
                eprintln!(
                    "{} matching lines in {} files{}",
                    summary.total_results,
                    summary.files_searched,
                    if summary.truncated { " (truncated)" } else { "" }
                );
            }
            SearchUpdate::Failed { message, .. } => {
                eprintln!("search failed: {message}");
                return Ok(ExitCode::FAILURE);
            }
            SearchUpdate::Cancelled { .. } => break,
        }
    }

    if let Some(store) = store.as_mut() {
        if let Err(e) = store.record_command(SEARCH_COMMAND) {
            tracing::warn!(error = %e, "command history not saved");
        }
    }

    let Some(first) = workspace.search_session().results().first().cloned() else {
        return Ok(ExitCode::from(1));
    };
    workspace.open_search_result(PaneId::Primary, &first).await?;
    if let Some(tab) = workspace.active_tab() {
        tracing::info!(path = %tab.path, line = first.line, "opened first match");
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let _logging = logging::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(ParseOutcome::Run(args)) => args,
        Ok(ParseOutcome::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "zcode-workspace failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/cli_args.rs"]
mod tests;
