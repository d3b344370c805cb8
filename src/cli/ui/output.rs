use console::style;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    /// Indented, dimmed lines under the previous message
    pub fn detail(&self, message: &str) {
        for line in message.lines() {
            println!("  {}", style(line).dim());
        }
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Assistant reply in the chat front end
    pub fn reply(&self, message: &str) {
        println!("\n{}\n{}", style("助手:").cyan().bold(), message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
