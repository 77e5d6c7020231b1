/// Lines of generated code with their nesting level.
///
/// Levels are relative; the indentation unit is only applied on
/// [`render`](Lines::render).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lines {
    lines: Vec<(usize, String)>,
}

impl Lines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(line: impl Into<String>) -> Self {
        let mut lines = Self::new();
        lines.push(line);
        lines
    }

    pub fn push(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push((0, line.into()));
        self
    }

    pub fn push_indented(&mut self, level: usize, line: impl Into<String>) -> &mut Self {
        self.lines.push((level, line.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.push(String::new())
    }

    /// Append `other`, nested `level` steps deeper.
    pub fn append(&mut self, other: Lines, level: usize) -> &mut Self {
        self.lines.extend(
            other
                .lines
                .into_iter()
                .map(|(depth, line)| (depth + level, line)),
        );
        self
    }

    /// Append every non-empty block, with a blank line between blocks.
    pub fn append_separated(&mut self, blocks: impl IntoIterator<Item = Lines>, level: usize) {
        for block in blocks.into_iter().filter(|block| !block.is_empty()) {
            if !self.is_empty() {
                self.blank();
            }
            self.append(block, level);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn render(&self, indent: &str) -> String {
        self.lines
            .iter()
            .map(|(level, line)| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", indent.repeat(*level), line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_applies_levels() {
        let mut body = Lines::new();
        body.push("int x;");
        let mut lines = Lines::single("struct A {");
        lines.append(body, 1);
        lines.push("};");

        assert_eq!(lines.render("  "), "struct A {\n  int x;\n};");
    }

    #[test]
    fn test_append_separated_skips_empty_blocks() {
        let mut lines = Lines::new();
        lines.append_separated(
            [Lines::single("a"), Lines::new(), Lines::single("b")],
            0,
        );
        assert_eq!(lines.render("\t"), "a\n\nb");
    }
}
