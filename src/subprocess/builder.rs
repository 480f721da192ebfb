use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One external-tool invocation: executable, flat argument vector, and an
/// environment snapshot. An empty environment means the child inherits the
/// parent's.
#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

impl ProcessCommand {
    /// The command as a single display string, used in error reports and
    /// logs.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: ProcessCommand {
                program: program.to_string(),
                args: Vec::new(),
                env: HashMap::new(),
                working_dir: None,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command
            .args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self.command
                .env
                .insert(key.as_ref().to_string(), value.as_ref().to_string());
        }
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.command.working_dir = Some(dir.to_path_buf());
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_command_with_args_and_env() {
        let command = ProcessCommandBuilder::new("ckati")
            .arg("--regen")
            .args(["-f", "main.mk"])
            .env("TARGET", "aosp_arm")
            .build();

        assert_eq!(command.program, "ckati");
        assert_eq!(command.args, vec!["--regen", "-f", "main.mk"]);
        assert_eq!(command.env.get("TARGET").map(String::as_str), Some("aosp_arm"));
        assert_eq!(command.command_line(), "ckati --regen -f main.mk");
    }

    #[test]
    fn command_line_without_args_is_just_the_program() {
        let command = ProcessCommandBuilder::new("ckati").build();
        assert_eq!(command.command_line(), "ckati");
    }
}
