/// ANSI color codes for console rendering
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub heading: &'static str,   // Bold for section headings
    pub column: &'static str,    // Cyan for column names
    pub number: &'static str,    // Yellow for counts and numeric stats
    pub value: &'static str,     // Green for extracted values
    pub timestamp: &'static str, // Blue for timestamp bounds
    pub dim: &'static str,       // Gray for line numbers and separators
    pub reset: &'static str,     // Reset to default color
}

impl ColorScheme {
    pub fn new(use_colors: bool) -> Self {
        if use_colors {
            Self {
                heading: "\x1b[1m",
                column: "\x1b[36m",
                number: "\x1b[33m",
                value: "\x1b[32m",
                timestamp: "\x1b[34m",
                dim: "\x1b[90m",
                reset: "\x1b[0m",
            }
        } else {
            // All empty strings for no-color mode
            Self {
                heading: "",
                column: "",
                number: "",
                value: "",
                timestamp: "",
                dim: "",
                reset: "",
            }
        }
    }

    pub fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }
}
