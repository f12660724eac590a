// src/cli/progress.rs - Terminal progress renderer for fan-out batches

use std::io::Write;

use crate::core::types::ProgressEvent;

/// Build a progress callback that redraws one status line on stderr.
///
/// Stdout stays clean for command output. The final event ends the line.
pub fn terminal_progress(label: &'static str) -> impl Fn(ProgressEvent) + Send + Sync + 'static {
    move |event| {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}", format_progress(label, event));
        if event.done >= event.total {
            let _ = writeln!(err);
        }
        let _ = err.flush();
    }
}

pub fn format_progress(label: &str, event: ProgressEvent) -> String {
    format!(
        "[{}] {}/{} ({:.0}%)",
        label,
        event.done,
        event.total,
        event.percent()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_progress() {
        let line = format_progress("judge", ProgressEvent { done: 1, total: 3 });
        assert_eq!(line, "[judge] 1/3 (33%)");
        let line = format_progress("generate", ProgressEvent { done: 4, total: 4 });
        assert_eq!(line, "[generate] 4/4 (100%)");
    }
}
