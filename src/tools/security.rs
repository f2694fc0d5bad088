// Characters that chain, substitute or redirect in bash and PowerShell.
const SHELL_CONTROL: &[char] = &[';', '&', '|', '$', '`', '(', ')', '<', '>', '\n', '\r'];

#[derive(Debug, Clone, Default)]
pub struct SecurityChecker {
    allowed_commands: Vec<String>,
}

impl SecurityChecker {
    pub fn new(allowed_commands: Vec<String>) -> Self {
        Self { allowed_commands }
    }

    /// Check if a command is allowed based on the allowed_commands list
    pub fn is_command_allowed(&self, command: &str) -> bool {
        // An empty list keeps the unrestricted behavior: the model may run anything.
        if self.allowed_commands.is_empty() {
            return true;
        }

        let command = command.trim();
        // Only a single simple command can be matched against the list.
        if command.contains(SHELL_CONTROL) {
            return false;
        }
        self.allowed_commands
            .iter()
            .any(|allowed| command == allowed || command.starts_with(&format!("{allowed} ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_allows_everything() {
        let checker = SecurityChecker::default();
        assert!(checker.is_command_allowed("rm -rf /tmp/x"));
    }

    #[test]
    fn prefix_match_requires_word_boundary() {
        let checker = SecurityChecker::new(vec!["ls".into(), "git status".into()]);
        assert!(checker.is_command_allowed("ls"));
        assert!(checker.is_command_allowed("ls -la"));
        assert!(checker.is_command_allowed("git status --short"));
        assert!(!checker.is_command_allowed("lsblk"));
        assert!(!checker.is_command_allowed("git push"));
    }

    #[test]
    fn chained_or_substituted_commands_are_rejected() {
        let checker = SecurityChecker::new(vec!["echo".into()]);
        assert!(checker.is_command_allowed("echo 'hello world'"));
        assert!(!checker.is_command_allowed("echo ok; rm -rf /tmp/x"));
        assert!(!checker.is_command_allowed("echo $(id -un)"));
        assert!(!checker.is_command_allowed("echo `id -un`"));
        assert!(!checker.is_command_allowed("echo ok && curl example.com"));
        assert!(!checker.is_command_allowed("echo ok || true"));
        assert!(!checker.is_command_allowed("echo ok | sh"));
        assert!(!checker.is_command_allowed("echo ok > /etc/passwd"));
        assert!(!checker.is_command_allowed("echo ok\nrm -rf /tmp/x"));
    }

    #[test]
    fn unrestricted_list_still_allows_pipelines() {
        let checker = SecurityChecker::default();
        assert!(checker.is_command_allowed("ls | wc -l"));
    }
}
