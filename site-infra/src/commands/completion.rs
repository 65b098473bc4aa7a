use std::io::stdout;

use clap::{Command, CommandFactory};
use clap_complete::{generate, Generator, Shell};

use crate::Cli;

#[derive(clap::Args)]
pub struct CompletionArgs {
    #[arg(long, value_enum)]
    shell: Shell,
}

pub fn completion(args: &CompletionArgs) {
    let mut cmd = Cli::command();
    print_completions(args.shell, &mut cmd);
}

fn print_completions<G: Generator>(generator: G, cmd: &mut Command) {
    let name = cmd.get_name().to_string();
    generate(generator, cmd, name, &mut stdout());
}
