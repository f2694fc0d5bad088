mod date;
mod execute;
mod security;

pub use date::{DATE_FORMAT, get_current_date};
pub use execute::{NO_OUTPUT, Shell, format_output};
pub use security::SecurityChecker;

/// The local side of the tool registry: everything a tool call may touch.
#[derive(Debug, Clone)]
pub struct LocalTools {
    pub shell: Shell,
    pub security: SecurityChecker,
}

impl Default for LocalTools {
    fn default() -> Self {
        Self::new(Shell::detect(), SecurityChecker::default())
    }
}

impl LocalTools {
    pub fn new(shell: Shell, security: SecurityChecker) -> Self {
        Self { shell, security }
    }
}
