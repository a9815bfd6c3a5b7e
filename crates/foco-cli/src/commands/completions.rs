use clap::CommandFactory;
use clap_complete::Shell;

use super::CmdResult;
use crate::Cli;

pub fn run(shell: Shell) -> CmdResult {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "foco", &mut std::io::stdout());
    Ok(())
}
