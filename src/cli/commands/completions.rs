//! `mao completions` - shell completion scripts
//!
//! Completes every screen and its subcommands, plus the fixed value sets
//! of `--status`, `--date` and `--format`. Statuses the backend may send
//! but that cannot be filtered on are not offered.
//!
//! ```bash
//! source <(mao completions bash)
//! mao completions zsh > "${fpath[1]}/_mao"
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io::{self, Write};

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}
