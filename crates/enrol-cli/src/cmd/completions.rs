//! `enrol completions <shell>`: print a completion script.

use clap::{Args, Command};
use clap_complete::{Shell, generate};
use std::io::{self, Write};

const BIN_NAME: &str = "enrol";

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// bash, zsh, fish, elvish or powershell.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute `enrol completions`. `command` is the full `enrol` command tree.
pub fn run_completions(args: &CompletionsArgs, command: &mut Command) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    write_completions(args.shell, command, &mut out)?;
    Ok(())
}

fn write_completions(shell: Shell, command: &mut Command, out: &mut dyn Write) -> io::Result<()> {
    generate(shell, command, BIN_NAME, out);
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Command {
        Command::new(BIN_NAME)
            .subcommand(Command::new("programs"))
            .subcommand(Command::new("university").subcommand(Command::new("stats")))
    }

    #[test]
    fn scripts_name_the_binary_and_subcommands() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut buf = Vec::new();
            write_completions(shell, &mut tree(), &mut buf).expect("write");
            let script = String::from_utf8(buf).expect("utf8");
            assert!(script.contains(BIN_NAME), "{shell}");
            assert!(script.contains("programs"), "{shell}");
            assert!(script.contains("stats"), "{shell}");
        }
    }
}
