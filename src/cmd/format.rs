/*!
format.rs

Formatting primitives for human output paths (tables, color).

- Color enabled by default, disabled via NO_COLOR env.
- Width detection is best-effort: COLUMNS env, clamped 40..=220, else 100.
- JSON output paths must not use these helpers; machine output stays clean.
*/

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let use_color = std::env::var_os("NO_COLOR").is_none();

        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color,
            term_width,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Accent,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Accent => "38;5;213",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Table                                                                      */
/* -------------------------------------------------------------------------- */

/// Render a plain aligned table: headers, separator, rows. Cells wider than
/// the per-column budget are truncated with an ellipsis.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    // Shrink the widest column until the row fits the terminal.
    let gap = 2;
    loop {
        let total: usize = widths.iter().sum::<usize>() + gap * cols.saturating_sub(1);
        if total <= style.term_width {
            break;
        }
        let widest = match (0..widths.len()).max_by_key(|&i| widths[i]) {
            Some(i) if widths[i] > 8 => i,
            _ => break,
        };
        widths[widest] -= 1;
    }

    let mut out = String::new();
    let render_row = |cells: &[String], widths: &[usize]| -> String {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            let cell = truncate_ellipsis(cell, widths[i]);
            line.push_str(&format!("{:<width$}", cell, width = widths[i]));
            if i + 1 < cells.len() {
                line.push_str("  ");
            }
        }
        line.trim_end().to_string()
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&color(Role::Primary, render_row(&header_cells, &widths), style));
    out.push('\n');
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&color(Role::Dim, render_row(&sep, &widths), style));
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(row, &widths));
    }
    out
}

/// Truncate to `max_chars`, appending a single-char ellipsis when cut.
pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> StyleOptions {
        StyleOptions {
            use_color: false,
            term_width: 80,
        }
    }

    #[test]
    fn table_alignment() {
        let rows = vec![
            vec!["/ha-datacenter/host".to_string(), "Folder".to_string()],
            vec!["/ha-datacenter/vm".to_string(), "Folder".to_string()],
        ];
        let t = table(&["PATH", "KIND"], &rows, &plain());
        let lines: Vec<_> = t.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("PATH"));
        assert!(lines[1].starts_with("----"));
        assert!(lines[2].contains("Folder"));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_ellipsis("short", 10), "short");
        assert_eq!(truncate_ellipsis("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_ellipsis("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn color_respects_style() {
        let styled = color(Role::Error, "x", &plain());
        assert_eq!(styled, "x");
    }
}
