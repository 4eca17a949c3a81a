/// Header row plus data rows; `None` is a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Header first, missing cells as empty strings.
    pub fn values(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.header.clone());
        for row in &self.rows {
            out.push(row.iter().map(|c| c.clone().unwrap_or_default()).collect());
        }
        out
    }

    /// Fixed-width text rendering, cells cut to `max_width` chars.
    pub fn render_text(&self, max_width: usize) -> String {
        let cells: Vec<Vec<String>> = self
            .values()
            .into_iter()
            .map(|row| row.into_iter().map(|c| truncate(&one_line(&c), max_width)).collect())
            .collect();

        let mut widths = vec![0usize; self.header.len()];
        for row in &cells {
            for (i, c) in row.iter().enumerate() {
                if i < widths.len() { widths[i] = widths[i].max(c.chars().count()); }
            }
        }

        let mut out = String::new();
        for (n, row) in cells.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            out.push_str(line.join(" | ").trim_end());
            out.push('\n');
            if n == 0 {
                let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
                out.push_str(&"-".repeat(total));
                out.push('\n');
            }
        }
        out
    }
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
