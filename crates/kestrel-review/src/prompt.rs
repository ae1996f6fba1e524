use kestrel_core::{AnalysisKind, Language};

const QUALITY_PERSONA: &str =
    "You are an expert code reviewer who provides detailed, actionable feedback.";
const SECURITY_PERSONA: &str = "You are a security expert who identifies vulnerabilities in code.";
const TESTS_PERSONA: &str = "You are a testing expert who writes comprehensive test suites.";

/// Fixed system persona for an analysis kind.
///
/// # Examples
///
/// ```
/// use kestrel_core::AnalysisKind;
/// use kestrel_review::prompt::system_prompt;
///
/// assert!(system_prompt(AnalysisKind::Security).contains("security expert"));
/// ```
pub fn system_prompt(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Quality => QUALITY_PERSONA,
        AnalysisKind::Security => SECURITY_PERSONA,
        AnalysisKind::Tests => TESTS_PERSONA,
    }
}

/// Render the user prompt for an analysis kind.
pub fn build_user_prompt(kind: AnalysisKind, code: &str, language: Language) -> String {
    match kind {
        AnalysisKind::Quality => build_quality_prompt(code, language),
        AnalysisKind::Security => build_security_prompt(code, language),
        AnalysisKind::Tests => build_tests_prompt(code, language),
    }
}

/// Quality review template: score out of 100, up to 5 prioritized
/// issues, 2-3 improvements, and a refactored version.
pub fn build_quality_prompt(code: &str, language: Language) -> String {
    format!(
        "You are an expert code reviewer. Analyze this {language} code and provide a comprehensive review:\n\
         \n\
         ```{language}\n\
         {code}\n\
         ```\n\
         \n\
         Provide:\n\
         \n\
         ## Score: X/100\n\
         \n\
         Rate based on: correctness, readability, efficiency, and best practices.\n\
         \n\
         ## Issues Found\n\
         \n\
         List only the MOST IMPORTANT issues (maximum 5). For each:\n\
         - Severity (CRITICAL/HIGH/MEDIUM)\n\
         - What's wrong\n\
         - Why it matters\n\
         \n\
         ## Key Improvements\n\
         \n\
         Provide 2-3 actionable improvements with code examples.\n\
         \n\
         ## Refactored Code\n\
         ```{language}\n\
         [improved version]\n\
         ```\n\
         \n\
         Keep it concise and practical. Focus on what matters most.\n"
    )
}

/// Security template: only vulnerabilities actually present in the code,
/// with a fixed fallback sentence for code that has none.
pub fn build_security_prompt(code: &str, language: Language) -> String {
    format!(
        "You are a security expert analyzing {language} code for vulnerabilities.\n\
         \n\
         Analyze this code for security issues:\n\
         \n\
         ```{language}\n\
         {code}\n\
         ```\n\
         \n\
         Rules:\n\
         - Only report vulnerabilities that are ACTUALLY PRESENT in this specific code\n\
         - If the code doesn't interact with databases, don't mention SQL injection\n\
         - If the code doesn't handle web input, don't mention XSS\n\
         - If the code doesn't use authentication, don't mention auth issues\n\
         - Be specific and practical\n\
         \n\
         If the code is a simple algorithm or utility function with no security concerns, say:\n\
         \"No significant security vulnerabilities detected. This appears to be a simple utility function.\"\n\
         \n\
         Otherwise, for each REAL vulnerability found:\n\
         \n\
         ## [Vulnerability Name]\n\
         \n\
         **Severity:** CRITICAL/HIGH/MEDIUM/LOW\n\
         **Location:** Specific line or section\n\
         **Issue:** What's actually wrong\n\
         **Fix:** How to fix it with code example\n"
    )
}

/// Test generation template: normal, edge, and error case coverage with
/// runnable test code in a language-appropriate framework.
pub fn build_tests_prompt(code: &str, language: Language) -> String {
    format!(
        "You are a testing expert. Generate comprehensive test cases for this {language} code:\n\
         \n\
         ```{language}\n\
         {code}\n\
         ```\n\
         \n\
         Generate tests covering:\n\
         \n\
         1. Normal Cases: Expected behavior with valid inputs\n\
         2. Edge Cases: Boundary conditions, empty inputs, large inputs\n\
         3. Error Cases: Invalid inputs, exceptions, error handling\n\
         \n\
         Provide complete, runnable test code using the appropriate testing framework:\n\
         - Python: pytest\n\
         - JavaScript/TypeScript: Jest\n\
         - Java: JUnit\n\
         \n\
         Format:\n\
         \n\
         ## Test Suite Overview\n\
         \n\
         Brief description of testing strategy and coverage.\n\
         \n\
         ## Test Code\n\
         \n\
         ```{language}\n\
         [complete test code that can be run as-is]\n\
         ```\n\
         \n\
         ## Test Cases Explained\n\
         \n\
         List each test case with what it tests, expected outcome, and why it matters.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personas_match_kinds() {
        assert!(system_prompt(AnalysisKind::Quality).contains("expert code reviewer"));
        assert!(system_prompt(AnalysisKind::Security).contains("security expert"));
        assert!(system_prompt(AnalysisKind::Tests).contains("testing expert"));
    }

    #[test]
    fn quality_prompt_embeds_code_and_language() {
        let prompt = build_quality_prompt("def f(): return 1", Language::Python);
        assert!(prompt.contains("```python\ndef f(): return 1\n```"));
        assert!(prompt.contains("## Score: X/100"));
        assert!(prompt.contains("maximum 5"));
        assert!(prompt.contains("CRITICAL/HIGH/MEDIUM"));
        assert!(prompt.contains("2-3 actionable improvements"));
        assert!(prompt.contains("## Refactored Code"));
    }

    #[test]
    fn security_prompt_has_no_findings_fallback() {
        let prompt = build_security_prompt("x = 1", Language::Python);
        assert!(prompt.contains("ACTUALLY PRESENT"));
        assert!(prompt.contains(
            "No significant security vulnerabilities detected. \
             This appears to be a simple utility function."
        ));
        assert!(prompt.contains("CRITICAL/HIGH/MEDIUM/LOW"));
        assert!(prompt.contains("**Location:**"));
        assert!(prompt.contains("**Fix:**"));
    }

    #[test]
    fn tests_prompt_covers_three_categories() {
        let prompt = build_tests_prompt("fn add(a: i32, b: i32) -> i32 { a + b }", Language::Rust);
        assert!(prompt.contains("Normal Cases"));
        assert!(prompt.contains("Edge Cases"));
        assert!(prompt.contains("Error Cases"));
        assert!(prompt.contains("pytest"));
        assert!(prompt.contains("```rust\nfn add"));
        assert!(prompt.contains("## Test Cases Explained"));
    }

    #[test]
    fn dispatcher_selects_matching_template() {
        let code = "print('hi')";
        assert_eq!(
            build_user_prompt(AnalysisKind::Quality, code, Language::Python),
            build_quality_prompt(code, Language::Python)
        );
        assert_eq!(
            build_user_prompt(AnalysisKind::Security, code, Language::Python),
            build_security_prompt(code, Language::Python)
        );
        assert_eq!(
            build_user_prompt(AnalysisKind::Tests, code, Language::Python),
            build_tests_prompt(code, Language::Python)
        );
    }

    #[test]
    fn language_tag_labels_the_fence() {
        for lang in Language::all() {
            let prompt = build_quality_prompt("code", lang);
            assert!(prompt.contains(&format!("```{lang}\n")));
        }
    }
}
