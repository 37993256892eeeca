use std::io::{self, Write};

use anyhow::Error;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    let msg = err.to_string();
    for line in wrap(&msg, 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 59) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = collect_hints(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

fn collect_hints(err: &Error) -> Option<Vec<String>> {
    use soap_prep::PipelineError;

    let mut hints = Vec::new();

    if let Some(pipe_err) = err.downcast_ref::<PipelineError>() {
        match pipe_err {
            PipelineError::Io { source, .. } => {
                collect_std_io_hints(&mut hints, source);
            }

            PipelineError::NoRawFormat(_) => {
                hints.push("Each sample directory needs exactly one raw structure".to_string());
                hints.push("Supported markers: geometry.in.next_step, lmp.data.relax".to_string());
            }

            PipelineError::AmbiguousRawFormat(_) => {
                hints.push("Two raw markers were found in the same sample".to_string());
                hints.push("Delete the stale one so the intent is unambiguous".to_string());
            }

            PipelineError::Format { path, .. } => {
                hints.push(format!("Inspect '{}' for malformed entries", path.display()));
                hints.push("The line number in the cause points at the issue".to_string());
            }

            PipelineError::Descriptor(_) => {
                hints.push("Check --rcut and --sigma are positive and finite".to_string());
                hints.push("Structures must contain only H and C atoms".to_string());
            }

            PipelineError::MissingDescriptor(_) => {
                hints.push("Descriptors must exist before statistics are computed".to_string());
                hints.push("Re-run the training command from the start".to_string());
            }

            PipelineError::NpzRead { .. } | PipelineError::NpzWrite { .. } => {
                hints.push("The archive may be truncated or from an old run".to_string());
                hints.push("Delete it and re-run to regenerate".to_string());
            }

            PipelineError::EmptySampleSet => {
                hints.push("The set directory contains no sample subdirectories".to_string());
                hints.push("Check the dataset root path".to_string());
            }
        }
    } else if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
        collect_std_io_hints(&mut hints, io_err);
    }

    if hints.is_empty() { None } else { Some(hints) }
}

fn collect_std_io_hints(hints: &mut Vec<String>, source: &std::io::Error) {
    use std::io::ErrorKind;

    match source.kind() {
        ErrorKind::NotFound => {
            hints.push("File or directory not found".to_string());
            hints.push("Check the path spelling and ensure it exists".to_string());
        }

        ErrorKind::PermissionDenied => {
            hints.push("Permission denied accessing the file".to_string());
            hints.push("Check file permissions with `ls -la`".to_string());
        }

        ErrorKind::WriteZero => {
            hints.push("Failed to write data (disk full?)".to_string());
            hints.push("Check available disk space".to_string());
        }

        _ => {
            hints.push("I/O operation failed".to_string());
            hints.push("Check file path, permissions, and disk space".to_string());
        }
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
