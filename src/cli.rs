use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser, Clone, Debug)]
#[command(
    name = "dirhop",
    about = "Fuzzy-find a project directory and jump into it",
    version = "0.1.0"
)]
pub struct Cli {
    /// override the configured projects root for this run
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// print a shell function that wires the picked directory into `cd`
    Init {
        /// projects root baked into the generated function
        path: Option<String>,
    },
}

/// emit the wrapper for the user's shell; the inner call keeps its UI on
/// the tty via stderr while stdout carries the `cd` line to eval
pub fn print_init_script(projects_path: Option<&str>) {
    let path_flag = match projects_path {
        Some(path) => format!(" --path=\"{}\"", path),
        None => String::new(),
    };

    let shell = std::env::var("SHELL").unwrap_or_default();

    if shell.contains("fish") {
        println!(
            "function dirhop
  set -l output (command dirhop{path_flag} $argv 2>/dev/tty | string collect)
  set -l exit_code $status

  if test $exit_code -eq 0 -a -n \"$output\"
    eval $output
  else
    return $exit_code
  end
end"
        );
    } else {
        println!(
            "dirhop() {{
  local output
  output=$(command dirhop{path_flag} \"$@\" 2>/dev/tty)
  local exit_code=$?

  if [ $exit_code -eq 0 ] && [ -n \"$output\" ]; then
    eval \"$output\"
  else
    return $exit_code
  fi
}}"
        );
    }
}
