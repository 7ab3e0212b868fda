pub mod run;
pub mod show;
pub mod inspect;
pub mod report;

use crate::formatter::{print_info, print_success, OutputFormat};

pub struct CommandContext {
    pub format: OutputFormat,
}

impl CommandContext {
    pub fn new(format_str: &str) -> Self {
        Self {
            format: OutputFormat::from_str(format_str),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Status lines stay out of stdout when it carries machine-readable JSON.
    pub fn info(&self, msg: &str) {
        if !self.is_json() {
            print_info(msg);
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.is_json() {
            print_success(msg);
        }
    }
}
