//! Command-string construction for running files in the embedded shell.
//!
//! The shell receives plain command strings; nothing is validated or
//! escaped beyond wrapping paths in double quotes, so the caller owns
//! correctness for exotic file names. Construction is pure and separated
//! from dispatch so it can be tested without a live shell.

use std::path::Path;

/// Shell commands that run `file` with `interpreter`, in order.
///
/// Interpreted languages get a single invocation; compiled ones get a
/// compile step followed by a run step; HTML/CSS open in whatever the
/// platform associates with them. `None` means the extension isn't
/// runnable from the editor.
pub fn run_commands(file: &Path, interpreter: &str) -> Option<Vec<String>> {
    let ext = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let path = file.display();
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let commands = match ext.as_str() {
        "py" | "js" | "rb" | "php" | "lua" => {
            vec![format!("\"{interpreter}\" \"{path}\"")]
        }
        "java" => vec![
            format!("\"{interpreter}\" \"{path}\""),
            format!("java \"{stem}\""),
        ],
        "cpp" | "cc" | "c" | "rs" => vec![
            format!("\"{interpreter}\" \"{path}\" -o \"{stem}\""),
            format!("./\"{stem}\""),
        ],
        "go" => vec![format!("\"{interpreter}\" run \"{path}\"")],
        "html" | "css" => vec![open_command(file)],
        _ => return None,
    };

    Some(commands)
}

/// Platform command that opens a file with its default application.
fn open_command(file: &Path) -> String {
    let path = file.display();
    if cfg!(windows) {
        format!("start \"\" \"{path}\"")
    } else if cfg!(target_os = "macos") {
        format!("open \"{path}\"")
    } else {
        format!("xdg-open \"{path}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpreted_languages_run_directly() {
        let commands = run_commands(Path::new("/proj/app.py"), "/usr/bin/python3").unwrap();
        assert_eq!(commands, vec!["\"/usr/bin/python3\" \"/proj/app.py\""]);

        let commands = run_commands(Path::new("/proj/app.js"), "node").unwrap();
        assert_eq!(commands, vec!["\"node\" \"/proj/app.js\""]);
    }

    #[test]
    fn test_paths_with_spaces_are_quoted() {
        let commands =
            run_commands(Path::new("/my project/the app.py"), "/usr/bin/python3").unwrap();
        assert_eq!(
            commands,
            vec!["\"/usr/bin/python3\" \"/my project/the app.py\""]
        );
    }

    #[test]
    fn test_compiled_languages_compile_then_run() {
        let commands = run_commands(Path::new("main.rs"), "rustc").unwrap();
        assert_eq!(
            commands,
            vec!["\"rustc\" \"main.rs\" -o \"main\"", "./\"main\""]
        );

        let commands = run_commands(Path::new("util.cc"), "g++").unwrap();
        assert_eq!(
            commands,
            vec!["\"g++\" \"util.cc\" -o \"util\"", "./\"util\""]
        );
    }

    #[test]
    fn test_java_runs_class_by_stem() {
        let commands = run_commands(Path::new("Main.java"), "javac").unwrap();
        assert_eq!(commands, vec!["\"javac\" \"Main.java\"", "java \"Main\""]);
    }

    #[test]
    fn test_go_uses_run_subcommand() {
        let commands = run_commands(Path::new("main.go"), "go").unwrap();
        assert_eq!(commands, vec!["\"go\" run \"main.go\""]);
    }

    #[test]
    fn test_html_opens_with_platform_opener() {
        let commands = run_commands(Path::new("index.html"), "unused").unwrap();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].contains("\"index.html\""));
        if cfg!(target_os = "linux") {
            assert!(commands[0].starts_with("xdg-open "));
        }
    }

    #[test]
    fn test_unknown_extension_is_not_runnable() {
        assert!(run_commands(Path::new("notes.txt"), "python").is_none());
        assert!(run_commands(Path::new("Makefile"), "make").is_none());
    }
}
