//! AI pseudo-language translation.
//!
//! `.pseudo` sources are plain-language program sketches. An optional
//! `<language>` header line picks the target language and `ai.prompt("...")`
//! lines carry the author's intent; the rest of the file is forwarded to an
//! external text-transform service which returns real code. The service
//! itself is out of scope and modeled as the [`TextTransform`] trait — the
//! live implementation is an HTTP client owned by the embedding frontend.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

/// File extension that routes a file through translation instead of a run.
pub const PSEUDO_EXTENSION: &str = "pseudo";

/// An opaque external text-transform service.
///
/// `instruction` tells the service what to do with `input`; the result is
/// expected to be bare code. Errors come back as display-ready strings and
/// end up as a line in the terminal output.
pub trait TextTransform {
    fn transform(&self, instruction: &str, input: &str) -> Result<String, String>;
}

/// A parsed pseudo-language source.
pub struct PseudoProgram {
    pub target_language: String,
    pub intent: Option<String>,
    pub body: String,
}

/// Split a pseudo source into header, intent directives, and body.
pub fn parse_pseudo(content: &str) -> PseudoProgram {
    let mut lines = content.lines().peekable();

    let mut target_language = "python".to_string();
    if let Some(first) = lines.peek() {
        let trimmed = first.trim();
        if trimmed.len() > 2 && trimmed.starts_with('<') && trimmed.ends_with('>') {
            target_language = trimmed[1..trimmed.len() - 1].to_ascii_lowercase();
            lines.next();
        }
    }

    let mut intent = None;
    let mut body_lines = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with("ai.prompt(") && trimmed.ends_with(')') {
            let inner = &trimmed["ai.prompt(".len()..trimmed.len() - 1];
            intent = Some(
                inner
                    .trim()
                    .trim_matches(|c| c == '"' || c == '\'')
                    .to_string(),
            );
        } else {
            body_lines.push(line);
        }
    }

    PseudoProgram {
        target_language,
        intent,
        body: body_lines.join("\n"),
    }
}

/// Translate a pseudo source and write the result next to it.
///
/// Returns the output path and target language. Service failures propagate
/// as the service's message; file I/O failures as a save error line.
pub fn translate_file(
    transform: &dyn TextTransform,
    file: &Path,
    content: &str,
) -> Result<(PathBuf, String), String> {
    let program = parse_pseudo(content);

    let intent = program
        .intent
        .as_deref()
        .unwrap_or("No specific prompt provided");
    let instruction = format!(
        "Translate this pseudocode to {}. Return only the corrected code without \
         explanations, comments, backticks, or markdown. The user's intent: {intent}",
        program.target_language
    );

    let result = transform.transform(&instruction, &program.body)?;
    let code = strip_markdown_fences(&result);

    let out_path = file.with_extension(extension_for(&program.target_language));
    fs::write(&out_path, &code).map_err(|e| format!("Save error: {e}"))?;

    Ok((out_path, program.target_language))
}

/// Route a buffer through the fix-this-code transform.
///
/// `content` still carries the `ai.fix()` directive on its first line; the
/// directive is dropped before the code is sent.
pub fn fix_source(transform: &dyn TextTransform, content: &str) -> Result<String, String> {
    let body = content.lines().skip(1).collect::<Vec<_>>().join("\n");
    let instruction = "Fix all bugs, errors, and syntax issues in this code. Return only the \
                       corrected code without explanations, comments, backticks, or markdown.";
    let result = transform.transform(instruction, &body)?;
    Ok(strip_markdown_fences(&result))
}

/// Drop a wrapping markdown code fence, language tag included, if the
/// service ignored the no-markdown instruction.
fn strip_markdown_fences(text: &str) -> String {
    let opening = Regex::new(r"^```[A-Za-z0-9_+#-]*[ \t]*\r?\n?").expect("valid fence pattern");
    let closing = Regex::new(r"\s*```\s*$").expect("valid fence pattern");

    let trimmed = text.trim();
    let without_opening = opening.replace(trimmed, "");
    closing.replace(&without_opening, "").into_owned()
}

/// Output file extension per target language, aliases included.
pub fn extension_for(language: &str) -> &'static str {
    match language.to_ascii_lowercase().as_str() {
        "python" | "py" => "py",
        "javascript" | "js" => "js",
        "html" => "html",
        "css" => "css",
        "ruby" | "rb" => "rb",
        "lua" => "lua",
        "c#" | "cs" => "cs",
        "c++" | "cpp" => "cpp",
        "java" => "java",
        "php" => "php",
        "rust" => "rs",
        "go" => "go",
        "swift" => "swift",
        _ => "txt",
    }
}
