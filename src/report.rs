//! GCC-style rendering of issues for terminals and editors.
//!
//! ```text
//! foo.c: In function 'bar':
//! foo.c:10:15: warning: something bad involving pointers [CWE-681]
//! here is some explanatory text
//! foo.c:7:12: note: first we do this
//! ```

use crate::models::{Analysis, Issue, Location};
use owo_colors::OwoColorize;
use regex::Regex;

/// Colour only when asked for and `NO_COLOR` is unset.
pub fn use_colors(requested: bool) -> bool {
    requested && std::env::var_os("NO_COLOR").is_none()
}

fn position(location: &Location) -> String {
    let path = &location.file.givenpath;
    match (location.line(), location.column()) {
        (Some(line), Some(column)) => format!("{}:{}:{}", path, line, column),
        (Some(line), None) => format!("{}:{}", path, line),
        _ => path.clone(),
    }
}

fn diagnostic(out: &mut String, location: &Location, kind: &str, msg: &str, color: bool) {
    let pos = position(location);
    let line = if color {
        let kind = match kind {
            "warning" => format!("{}:", kind).magenta().bold().to_string(),
            _ => format!("{}:", kind).cyan().bold().to_string(),
        };
        format!("{} {} {}", format!("{}:", pos).bold(), kind, msg)
    } else {
        format!("{}: {}: {}", pos, kind, msg)
    };
    out.push_str(&line);
    out.push('\n');
}

/// Render one issue, including its notes and trace.
pub fn issue_to_gcc(issue: &Issue, color: bool) -> String {
    let mut out = String::new();
    let location = &issue.location;
    if let Some(function) = &location.function {
        let header = format!(
            "{}: In function '{}':",
            location.file.givenpath, function.name
        );
        if color {
            out.push_str(&header.bold().to_string());
        } else {
            out.push_str(&header);
        }
        out.push('\n');
    }
    let msg = match issue.cwe_str() {
        Some(cwe) => format!("{} [{}]", issue.message.text, cwe),
        None => issue.message.text.clone(),
    };
    diagnostic(&mut out, location, "warning", &msg, color);
    if let Some(notes) = &issue.notes {
        out.push_str(notes.text.trim_end());
        out.push('\n');
    }
    if let Some(trace) = &issue.trace {
        for state in &trace.states {
            let text = state.notes.as_ref().map(|n| n.text.as_str()).unwrap_or("");
            diagnostic(&mut out, &state.location, "note", text, color);
        }
    }
    out
}

/// Render every issue of `analysis`, keeping only those whose test id
/// matches `test_id` when a filter is given.
pub fn analysis_to_gcc(analysis: &Analysis, test_id: Option<&Regex>, color: bool) -> String {
    analysis
        .results
        .iter()
        .filter_map(|r| r.as_issue())
        .filter(|issue| match test_id {
            Some(re) => issue.testid.as_deref().is_some_and(|id| re.is_match(id)),
            None => true,
        })
        .map(|issue| issue_to_gcc(issue, color))
        .collect()
}
