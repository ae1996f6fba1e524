use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KestrelError;

/// Maximum accepted code length in characters (Unicode scalar values).
pub const MAX_CODE_CHARS: usize = 10_000;

/// Programming language tag for submitted code.
///
/// The tag is interpolated into prompt templates and used as the fence
/// label for code blocks. Implements [`FromStr`] so it can be used
/// directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use kestrel_core::Language;
///
/// let lang: Language = "rust".parse().unwrap();
/// assert_eq!(lang, Language::Rust);
/// assert_eq!(lang.to_string(), "rust");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Java,
    Cpp,
    Go,
    Rust,
    Typescript,
}

impl Language {
    /// All supported language tags, in display order.
    pub fn all() -> [Language; 7] {
        [
            Language::Python,
            Language::Javascript,
            Language::Java,
            Language::Cpp,
            Language::Go,
            Language::Rust,
            Language::Typescript,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::Javascript => write!(f, "javascript"),
            Language::Java => write!(f, "java"),
            Language::Cpp => write!(f, "cpp"),
            Language::Go => write!(f, "go"),
            Language::Rust => write!(f, "rust"),
            Language::Typescript => write!(f, "typescript"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::Javascript),
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            "go" => Ok(Language::Go),
            "rust" => Ok(Language::Rust),
            "typescript" | "ts" => Ok(Language::Typescript),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// One of the three analysis operations.
///
/// The kind selects the prompt template, the per-operation token budget,
/// and the failure prefix used when wrapping transport errors.
///
/// # Examples
///
/// ```
/// use kestrel_core::AnalysisKind;
///
/// assert_eq!(AnalysisKind::Quality.max_tokens(), 2000);
/// assert_eq!(AnalysisKind::Security.max_tokens(), 1500);
/// assert_eq!(AnalysisKind::Tests.failure_prefix(), "Test generation failed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Code quality review with score, issues, and refactoring.
    Quality,
    /// Vulnerability check for issues actually present in the code.
    Security,
    /// Test suite generation covering normal, edge, and error cases.
    Tests,
}

impl AnalysisKind {
    /// Completion token budget for this operation.
    pub fn max_tokens(self) -> u32 {
        match self {
            AnalysisKind::Quality => 2000,
            AnalysisKind::Security | AnalysisKind::Tests => 1500,
        }
    }

    /// Prefix used when wrapping a transport failure for this operation.
    pub fn failure_prefix(self) -> &'static str {
        match self {
            AnalysisKind::Quality => "Analysis failed",
            AnalysisKind::Security => "Security check failed",
            AnalysisKind::Tests => "Test generation failed",
        }
    }

    /// Section heading used when rendering results.
    pub fn heading(self) -> &'static str {
        match self {
            AnalysisKind::Quality => "Code Quality Review",
            AnalysisKind::Security => "Security Analysis",
            AnalysisKind::Tests => "Suggested Tests",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::Quality => write!(f, "quality"),
            AnalysisKind::Security => write!(f, "security"),
            AnalysisKind::Tests => write!(f, "tests"),
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quality" => Ok(AnalysisKind::Quality),
            "security" => Ok(AnalysisKind::Security),
            "tests" | "test" => Ok(AnalysisKind::Tests),
            other => Err(format!("unknown analysis kind: {other}")),
        }
    }
}

/// A validated request for one analysis operation.
///
/// Construction enforces the input invariant: code must be non-empty
/// after trimming and at most [`MAX_CODE_CHARS`] characters. A request
/// that fails validation never reaches the network.
///
/// # Examples
///
/// ```
/// use kestrel_core::{AnalysisKind, Language, ReviewRequest};
///
/// let req = ReviewRequest::new("def f(): return 1", Language::Python, AnalysisKind::Quality);
/// assert!(req.is_ok());
///
/// let err = ReviewRequest::new("   ", Language::Python, AnalysisKind::Quality);
/// assert!(err.is_err());
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// The code to analyze, exactly as submitted.
    pub code: String,
    /// Language tag interpolated into the prompt.
    pub language: Language,
    /// Which analysis operation this request is for.
    pub kind: AnalysisKind,
}

impl ReviewRequest {
    /// Validate and construct a request.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::InvalidInput`] when the trimmed code is
    /// empty or the code exceeds [`MAX_CODE_CHARS`] characters.
    pub fn new(code: &str, language: Language, kind: AnalysisKind) -> Result<Self, KestrelError> {
        if code.trim().is_empty() {
            return Err(KestrelError::InvalidInput("code cannot be empty".into()));
        }
        if code.chars().count() > MAX_CODE_CHARS {
            return Err(KestrelError::InvalidInput(format!(
                "code exceeds maximum length of {MAX_CODE_CHARS} characters"
            )));
        }
        Ok(Self {
            code: code.to_string(),
            language,
            kind,
        })
    }
}

/// The outcome of one analysis operation.
///
/// The text is the model's markdown output, treated as opaque: no
/// parsing, no structural validation, rendered as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// Which operation produced this result.
    pub kind: AnalysisKind,
    /// Opaque markdown-formatted model output.
    pub text: String,
}

impl ReviewResult {
    /// Render the result as a markdown section.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel_core::{AnalysisKind, ReviewResult};
    ///
    /// let result = ReviewResult {
    ///     kind: AnalysisKind::Security,
    ///     text: "No significant security vulnerabilities detected.".into(),
    /// };
    /// assert!(result.to_markdown().starts_with("## Security Analysis"));
    /// ```
    pub fn to_markdown(&self) -> String {
        format!("## {}\n\n{}\n", self.kind.heading(), self.text)
    }
}

impl fmt::Display for ReviewResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = self.kind.heading();
        writeln!(f, "{heading}")?;
        writeln!(f, "{:=<1$}", "", heading.len())?;
        writeln!(f, "{}", self.text)
    }
}

/// Output format for CLI subcommands.
///
/// # Examples
///
/// ```
/// use kestrel_core::OutputFormat;
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_str() {
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("JS".parse::<Language>().unwrap(), Language::Javascript);
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("ts".parse::<Language>().unwrap(), Language::Typescript);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn language_roundtrips_through_display() {
        for lang in Language::all() {
            let parsed: Language = lang.to_string().parse().unwrap();
            assert_eq!(parsed, lang);
        }
    }

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"cpp\"");
    }

    #[test]
    fn analysis_kind_token_budgets() {
        assert_eq!(AnalysisKind::Quality.max_tokens(), 2000);
        assert_eq!(AnalysisKind::Security.max_tokens(), 1500);
        assert_eq!(AnalysisKind::Tests.max_tokens(), 1500);
    }

    #[test]
    fn analysis_kind_failure_prefixes() {
        assert_eq!(AnalysisKind::Quality.failure_prefix(), "Analysis failed");
        assert_eq!(
            AnalysisKind::Security.failure_prefix(),
            "Security check failed"
        );
        assert_eq!(
            AnalysisKind::Tests.failure_prefix(),
            "Test generation failed"
        );
    }

    #[test]
    fn analysis_kind_from_str() {
        assert_eq!(
            "quality".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::Quality
        );
        assert_eq!(
            "SECURITY".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::Security
        );
        assert_eq!("test".parse::<AnalysisKind>().unwrap(), AnalysisKind::Tests);
        assert!("performance".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn request_rejects_empty_code() {
        let err = ReviewRequest::new("", Language::Python, AnalysisKind::Quality).unwrap_err();
        assert!(matches!(err, KestrelError::InvalidInput(_)));
        assert!(err.to_string().contains("code cannot be empty"));
    }

    #[test]
    fn request_rejects_whitespace_only_code() {
        let err =
            ReviewRequest::new("  \n\t  ", Language::Go, AnalysisKind::Security).unwrap_err();
        assert!(matches!(err, KestrelError::InvalidInput(_)));
    }

    #[test]
    fn request_rejects_oversized_code() {
        let code = "x".repeat(MAX_CODE_CHARS + 1);
        let err = ReviewRequest::new(&code, Language::Rust, AnalysisKind::Tests).unwrap_err();
        assert!(err.to_string().contains("code exceeds maximum length"));
    }

    #[test]
    fn request_accepts_code_at_limit() {
        let code = "y".repeat(MAX_CODE_CHARS);
        let req = ReviewRequest::new(&code, Language::Java, AnalysisKind::Quality).unwrap();
        assert_eq!(req.code.len(), MAX_CODE_CHARS);
    }

    #[test]
    fn request_limit_counts_characters_not_bytes() {
        // Multi-byte characters stay within the limit as long as the
        // character count does.
        let code = "é".repeat(MAX_CODE_CHARS);
        assert!(code.len() > MAX_CODE_CHARS);
        assert!(ReviewRequest::new(&code, Language::Python, AnalysisKind::Quality).is_ok());
    }

    #[test]
    fn request_preserves_code_verbatim() {
        let req =
            ReviewRequest::new("  def f():\n    pass\n", Language::Python, AnalysisKind::Tests)
                .unwrap();
        assert_eq!(req.code, "  def f():\n    pass\n");
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = ReviewResult {
            kind: AnalysisKind::Quality,
            text: "## Score: 90/100".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "quality");
        assert_eq!(json["text"], "## Score: 90/100");
    }

    #[test]
    fn result_display_and_markdown() {
        let result = ReviewResult {
            kind: AnalysisKind::Tests,
            text: "## Test Suite Overview".into(),
        };
        let text = format!("{result}");
        assert!(text.starts_with("Suggested Tests\n==============="));

        let md = result.to_markdown();
        assert!(md.starts_with("## Suggested Tests\n"));
        assert!(md.contains("## Test Suite Overview"));
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
