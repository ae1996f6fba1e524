use std::io::IsTerminal;
use std::io::Read;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};

use kestrel_core::{AnalysisKind, Language, OutputFormat, ReviewResult};
use kestrel_review::client::ReviewClient;

#[derive(Parser)]
#[command(
    name = "kestrel",
    version,
    about = "AI code review assistant",
    long_about = "Kestrel sends your code to a hosted LLM and renders the review back:\n\
                   quality score and issues, security findings, and generated tests.\n\n\
                   Examples:\n  \
                     cat main.py | kestrel review                 Review code from stdin\n  \
                     kestrel review main.py -a quality -a tests   Pick analysis kinds\n  \
                     kestrel review lib.rs --language rust        Set the language tag\n  \
                     kestrel examples sql-injection | kestrel review\n  \
                     kestrel doctor                               Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .kestrel.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable output (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze code with the selected analysis kinds
    #[command(long_about = "Analyze code with the selected analysis kinds.\n\n\
        Reads code from a file argument or stdin and runs each selected analysis\n\
        as its own round trip to the completion endpoint: a quality review with a\n\
        score out of 100, a security check for vulnerabilities actually present,\n\
        and generated test cases.\n\n\
        Examples:\n  cat main.py | kestrel review\n  kestrel review main.py -a quality -a security -a tests\n  kestrel review util.go --language go --format markdown")]
    Review {
        /// Read code from this file instead of stdin
        file: Option<PathBuf>,

        /// Language of the submitted code
        #[arg(long, short, default_value = "python")]
        language: Language,

        /// Analysis kinds to run (repeatable)
        #[arg(
            long = "analysis",
            short = 'a',
            value_name = "KIND",
            default_values = ["quality", "security"],
            long_help = "Analysis kind to run. Repeat the flag to select several.\n\n\
                           Kinds:\n  \
                             quality   Score, top issues, improvements, refactored code\n  \
                             security  Vulnerabilities actually present in the code\n  \
                             tests     Normal/edge/error case test generation\n\n\
                           Each selected kind is an independent request; kinds run sequentially."
        )]
        analysis: Vec<AnalysisKind>,

        /// API key override (default: config file, then GROQ_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Show canned example snippets to try
    #[command(long_about = "Show canned example snippets to try.\n\n\
        Without a name, lists the available snippets. With a name, prints the\n\
        snippet code to stdout so it can be piped straight into review.\n\n\
        Examples:\n  kestrel examples\n  kestrel examples sql-injection | kestrel review")]
    Examples {
        /// Snippet to print (omit to list all)
        name: Option<String>,
    },
    /// Create a default .kestrel.toml configuration file
    #[command(long_about = "Create a default .kestrel.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .kestrel.toml already exists.")]
    Init,
    /// Check your Kestrel setup and environment
    #[command(long_about = "Check your Kestrel setup and environment.\n\n\
        Runs diagnostics for the config file, API credential, and the model and\n\
        endpoint in use. Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, clap::ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

struct ExampleSnippet {
    name: &'static str,
    description: &'static str,
    code: &'static str,
}

const EXAMPLES: &[ExampleSnippet] = &[
    ExampleSnippet {
        name: "vulnerable-login",
        description: "Login function with string-built SQL",
        code: "def login(username, password):\n    query = f\"SELECT * FROM users WHERE username='{username}' AND password='{password}'\"\n    cursor.execute(query)\n    return cursor.fetchone()",
    },
    ExampleSnippet {
        name: "inefficient-loop",
        description: "Quadratic loop over the same list",
        code: "def process_data(items):\n    result = []\n    for i in range(len(items)):\n        for j in range(len(items)):\n            if items[i] > items[j]:\n                result.append(items[i])\n    return result",
    },
    ExampleSnippet {
        name: "sql-injection",
        description: "Query concatenated from user input",
        code: "def get_user(user_id):\n    query = \"SELECT * FROM users WHERE id=\" + user_id\n    return db.execute(query)",
    },
    ExampleSnippet {
        name: "memory-leak",
        description: "Class-level cache that grows forever",
        code: "class DataProcessor:\n    cache = []\n\n    def process(self, data):\n        self.cache.append(data)\n        return len(self.cache)",
    },
    ExampleSnippet {
        name: "syntax-error",
        description: "Function definition missing parentheses",
        code: "def greeting:\n    return \"Hello, World!\"",
    },
];

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[33m⚡\x1b[0m \x1b[1mkestrel\x1b[0m v{version} — instant AI code reviews, security checks, and tests\n");

        println!("Quick start:");
        println!("  \x1b[36mkestrel init\x1b[0m                    Create a .kestrel.toml config file");
        println!("  \x1b[36mcat main.py | kestrel review\x1b[0m    Review code from stdin");
        println!("  \x1b[36mkestrel examples\x1b[0m                List snippets to try\n");

        println!("All commands:");
        println!("  \x1b[32mreview\x1b[0m    Quality review, security check, and test generation");
        println!("  \x1b[32mexamples\x1b[0m  Canned snippets to pipe into review");
        println!("  \x1b[32mdoctor\x1b[0m    Check your setup and environment");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("kestrel v{version} — instant AI code reviews, security checks, and tests\n");

        println!("Quick start:");
        println!("  kestrel init                    Create a .kestrel.toml config file");
        println!("  cat main.py | kestrel review    Review code from stdin");
        println!("  kestrel examples                List snippets to try\n");

        println!("All commands:");
        println!("  review    Quality review, security check, and test generation");
        println!("  examples  Canned snippets to pipe into review");
        println!("  doctor    Check your setup and environment");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'kestrel <command> --help' for details.");
}

fn read_code_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(input)
        }
    }
}

fn spinner_message(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Quality => "Analyzing code quality...",
        AnalysisKind::Security => "Checking security vulnerabilities...",
        AnalysisKind::Tests => "Generating test cases...",
    }
}

fn make_spinner(message: &'static str) -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})").unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    Some(pb)
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn run_doctor(
    config: &kestrel_core::KestrelConfig,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    let config_path = std::path::Path::new(".kestrel.toml");
    if config_path.exists() {
        checks.push(CheckResult::pass("config_file", ".kestrel.toml found"));
    } else {
        checks.push(CheckResult::fail(
            "config_file",
            ".kestrel.toml not found",
            "run 'kestrel init' to create a default config",
        ));
    }

    // 2. API credential
    if config.llm.api_key.is_some() {
        checks.push(CheckResult::pass(
            "api_key",
            "api_key set in .kestrel.toml",
        ));
    } else if std::env::var(kestrel_core::API_KEY_ENV).is_ok() {
        checks.push(CheckResult::pass(
            "api_key",
            format!("{} set", kestrel_core::API_KEY_ENV),
        ));
    } else {
        checks.push(CheckResult::fail(
            "api_key",
            format!("{} not set", kestrel_core::API_KEY_ENV),
            format!(
                "export {}=... or set api_key in .kestrel.toml under [llm]",
                kestrel_core::API_KEY_ENV
            ),
        ));
    }

    // 3. Model and endpoint
    let base_url = config
        .llm
        .base_url
        .as_deref()
        .unwrap_or("https://api.groq.com/openai");
    checks.push(CheckResult::info(
        "model",
        format!("{} via {base_url}", kestrel_review::llm::MODEL),
    ));

    // 4. Supported languages
    let languages: Vec<String> = Language::all().iter().map(ToString::to_string).collect();
    checks.push(CheckResult::info("languages", languages.join(", ")));

    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("Kestrel v{version} — Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<14} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Kestrel Configuration
# See: https://github.com/kestrel-ai/kestrel

[llm]
# API key for the Groq completion endpoint.
# Falls back to the GROQ_API_KEY environment variable when unset.
# api_key = "gsk-..."

# Custom OpenAI-compatible base URL (e.g. a local vLLM or Ollama server).
# base_url = "https://api.groq.com/openai"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => kestrel_core::KestrelConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".kestrel.toml");
            if default_path.exists() {
                kestrel_core::KestrelConfig::from_file(default_path)?
            } else {
                kestrel_core::KestrelConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Review {
            ref file,
            language,
            ref analysis,
            ref api_key,
        }) => {
            let code = read_code_input(file)?;

            // Hint: empty input, before the client rejects it
            if code.trim().is_empty() {
                miette::bail!(miette::miette!(
                    help = "Pipe code to kestrel (cat main.py | kestrel review), pass a file\n       argument, or try: kestrel examples sql-injection | kestrel review",
                    "Empty code input"
                ));
            }

            // Resolve the credential once, here: flag > config file > environment.
            let mut llm = config.llm.clone();
            if let Some(key) = api_key {
                llm.api_key = Some(key.clone());
            }
            let llm = llm.with_env_fallback();

            // Hint: missing API key — check before creating the client
            if llm.api_key.is_none() {
                miette::bail!(miette::miette!(
                    help = "export GROQ_API_KEY=... or set api_key in .kestrel.toml under [llm]",
                    "No API key configured for the completion endpoint"
                ));
            }

            let client = ReviewClient::new(&llm)?;

            let mut kinds: Vec<AnalysisKind> = Vec::new();
            for kind in analysis {
                if !kinds.contains(kind) {
                    kinds.push(*kind);
                }
            }

            if cli.verbose {
                eprintln!(
                    "model: {} | language: {language} | code: {} chars | kinds: {}",
                    kestrel_review::llm::MODEL,
                    code.chars().count(),
                    kinds
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                );
            }

            let mut results: Vec<ReviewResult> = Vec::new();
            for kind in kinds {
                let spinner = make_spinner(spinner_message(kind));

                let outcome = match kind {
                    AnalysisKind::Quality => client.analyze_quality(&code, language).await,
                    AnalysisKind::Security => client.check_security(&code, language).await,
                    AnalysisKind::Tests => client.suggest_tests(&code, language).await,
                };

                let text = outcome.inspect_err(|_e| {
                    if let Some(pb) = &spinner {
                        pb.finish_with_message("Failed");
                    }
                })?;

                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }

                let result = ReviewResult { kind, text };
                match cli.format {
                    OutputFormat::Text => {
                        println!("{result}");
                    }
                    OutputFormat::Markdown => {
                        println!("---\n");
                        println!("{}", result.to_markdown());
                    }
                    OutputFormat::Json => results.push(result),
                }
            }

            if cli.format == OutputFormat::Json {
                let json = serde_json::json!({
                    "language": language,
                    "results": results,
                });
                println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
            }
        }
        Some(Command::Examples { ref name }) => {
            match name {
                Some(name) => {
                    let Some(example) = EXAMPLES.iter().find(|e| e.name == *name) else {
                        let names: Vec<&str> = EXAMPLES.iter().map(|e| e.name).collect();
                        miette::bail!(miette::miette!(
                            help = format!("available snippets: {}", names.join(", ")),
                            "Unknown example: {name}"
                        ));
                    };
                    println!("{}", example.code);
                }
                None => match cli.format {
                    OutputFormat::Json => {
                        let list: Vec<serde_json::Value> = EXAMPLES
                            .iter()
                            .map(|e| {
                                serde_json::json!({
                                    "name": e.name,
                                    "description": e.description,
                                })
                            })
                            .collect();
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&list).into_diagnostic()?
                        );
                    }
                    _ => {
                        println!("Example snippets (kestrel examples <name> | kestrel review):\n");
                        for example in EXAMPLES {
                            println!("  {:<18} {}", example.name, example.description);
                        }
                    }
                },
            }
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".kestrel.toml");
            if path.exists() {
                miette::bail!(".kestrel.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .kestrel.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "kestrel", &mut std::io::stdout());
        }
    }

    Ok(())
}
