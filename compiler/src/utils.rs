use crate::error::GenaError;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn error(msg: &str, line: usize, column: usize) -> GenaError {
    GenaError::ParseError {
        msg: msg.to_string(),
        line,
        column,
    }
}

/// Block of generated source lines.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lines {
    lines: Vec<String>,
}

impl Lines {
    pub fn new() -> Self {
        Lines::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn append(&mut self, other: Lines) {
        self.lines.extend(other.lines);
    }

    /// Appends `other` shifted right by four spaces.
    pub fn append_indented(&mut self, other: Lines) {
        self.lines
            .extend(other.lines.into_iter().map(|line| format!("    {}", line)));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Joins the lines with `\n`, blanking lines made only of spaces.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if !line.chars().all(|c| c == ' ') {
                out.push_str(line);
            }
            out.push('\n');
        }
        out
    }
}

impl From<Vec<String>> for Lines {
    fn from(lines: Vec<String>) -> Self {
        Lines { lines }
    }
}

/// Appends `,` to every item but the last.
pub fn comma_separated(items: Vec<String>) -> Vec<String> {
    let last = items.len().saturating_sub(1);
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| if i == last { item } else { format!("{},", item) })
        .collect()
}

/// Joins blocks with one blank line between them.
pub fn separated(blocks: Vec<Lines>) -> Lines {
    let mut out = Lines::new();
    for block in blocks.into_iter().filter(|b| !b.is_empty()) {
        if !out.is_empty() {
            out.blank();
        }
        out.append(block);
    }
    out
}
