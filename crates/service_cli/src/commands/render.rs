//! Plain-text rendering of summaries and lattice grids

use std::fmt::Write;

use pricer_core::math::grid::TriangularGrid;

const CELL_WIDTH: usize = 12;

/// Render key/value rows as a boxed two-column table
pub fn table(rows: &[(&str, String)]) -> String {
    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0) + 2;
    let value_width = rows.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0) + 2;
    let bar = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{}{}{}{}\n",
            left,
            "─".repeat(key_width),
            mid,
            "─".repeat(value_width),
            right
        )
    };

    let mut out = bar("┌", "┬", "┐");
    for (i, (key, value)) in rows.iter().enumerate() {
        if i > 0 {
            out.push_str(&bar("├", "┼", "┤"));
        }
        let _ = writeln!(
            out,
            "│ {:<kw$} │ {:<vw$} │",
            key,
            value,
            kw = key_width - 2,
            vw = value_width - 2
        );
    }
    out.push_str(&bar("└", "┴", "┘"));
    out
}

/// Render an upper-triangular grid, one row per level, 4 decimals per cell
pub fn values(title: &str, grid: &TriangularGrid<f64>) -> String {
    cells(title, grid, |v| format!("{:.4}", v))
}

/// Render a boolean grid as `x` (set) and `.` (clear)
pub fn flags(title: &str, grid: &TriangularGrid<bool>) -> String {
    cells(title, grid, |set| if set { "x".to_string() } else { ".".to_string() })
}

fn cells<T, F>(title: &str, grid: &TriangularGrid<T>, format: F) -> String
where
    T: Copy,
    F: Fn(T) -> String,
{
    let steps = grid.steps();
    let mut out = format!("{}\n", title);
    for level in 0..=steps {
        let mut line = String::new();
        for step in 0..=steps {
            match grid.get(level, step) {
                Some(value) => {
                    let _ = write!(line, "{:>width$}", format(value), width = CELL_WIDTH);
                }
                None => line.push_str(&" ".repeat(CELL_WIDTH)),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let rendered = table(&[("Rule", "plain".to_string()), ("PV", "9.5405".to_string())]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "│ Rule │ plain  │");
        assert_eq!(lines[3], "│ PV   │ 9.5405 │");
        assert!(lines[0].starts_with('┌') && lines[4].ends_with('┘'));
    }

    #[test]
    fn test_values_upper_triangle() {
        let grid = TriangularGrid::from_fn(2, |level, step| (10 * step + level) as f64);
        let rendered = values("Prices", &grid);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Prices");
        assert_eq!(lines[1], format!("{:>12}{:>12}{:>12}", "0.0000", "10.0000", "20.0000"));
        assert_eq!(lines[3], format!("{:>36}", "22.0000"));
    }

    #[test]
    fn test_flags() {
        let grid = TriangularGrid::from_fn(1, |_, step| step == 0);
        let rendered = flags("Mask", &grid);
        assert_eq!(rendered.lines().nth(1), Some(format!("{:>12}{:>12}", "x", ".").as_str()));
    }
}
