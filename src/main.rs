/*!
Main binary for jsonsel.
*/

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use log::debug;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use jsonsel::{Document, Options, commands, utils};

/// Tokenize a JSON document and print the value at a dotted path.
#[derive(Parser)]
#[command(
    name = "jsel",
    version,
    about,
    long_about = None,
    disable_help_subcommand = true
)]
struct Args {
    /// Optional subcommands
    #[command(subcommand)]
    command: Option<Commands>,
    /// Dotted path to select (e.g., "nodes.1.name"). Selects the root if
    /// omitted
    path: Option<String>,
    #[arg(value_name = "FILE")]
    /// Optional path to JSON file. If omitted, reads from STDIN
    input: Option<PathBuf>,
    /// Parse and validate null and boolean literals
    #[arg(long, action = ArgAction::SetTrue)]
    literals: bool,
    /// Parse numbers as 64-bit floats
    #[arg(long, action = ArgAction::SetTrue)]
    doubles: bool,
    /// Parse numbers as 32-bit floats
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "doubles")]
    floats: bool,
    /// Parse and unescape all strings
    #[arg(long, action = ArgAction::SetTrue)]
    strings: bool,
    /// Maximum nesting depth of objects and arrays
    #[arg(long, value_name = "N", default_value_t = jsonsel::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Do not pretty-print the JSON output, instead use compact
    #[arg(long, action = ArgAction::SetTrue)]
    compact: bool,
    /// Display the number of tokens in the selected value
    #[arg(long, action = ArgAction::SetTrue)]
    count: bool,
    /// Display depth of the selected value
    #[arg(long, action = ArgAction::SetTrue)]
    depth: bool,
    /// Display the tokens of the selected value instead of the value
    #[arg(long, action = ArgAction::SetTrue)]
    tokens: bool,
    /// With --tokens, print one JSON object per token
    #[arg(long, action = ArgAction::SetTrue, requires = "tokens")]
    json_lines: bool,
    /// Do not display the selected JSON value
    #[arg(short, long, action = ArgAction::SetTrue)]
    no_display: bool,
    #[command(flatten)]
    verbose: Verbosity,
}

impl Args {
    /// Parse options selected on the command line.
    fn options(&self) -> Options {
        let mut options = Options::empty().with_max_depth(self.max_depth);
        if self.literals {
            options |= Options::PARSE_LITERALS;
        }
        if self.doubles {
            options |= Options::PARSE_DOUBLES;
        }
        if self.floats {
            options |= Options::PARSE_FLOATS;
        }
        if self.strings {
            options |= Options::PARSE_STRINGS;
        }
        options
    }
}

/// Available subcommands for `jsel`
#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    /// Generate additional documentation and/or completions
    Generate(GenerateCommand),
}

/// Generate shell completions and man page
#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate shell completions for the given shell to stdout.
    Shell { shell: clap_complete::Shell },
    /// Generate a man page for jsel to output directory if specified, else
    /// the current directory.
    Man {
        /// The output directory to write the man pages.
        #[clap(short, long)]
        output_dir: Option<PathBuf>,
    },
}

/// Entry point for main binary.
///
/// This tokenizes the input, selects the value at the given path and prints
/// it. If no file is given, it reads from STDIN. The output is printed to
/// STDOUT, with formatting determined by the command line arguments.
fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Some(Commands::Generate(ref cmd)) => match cmd {
            GenerateCommand::Shell { shell } => {
                commands::generate::write_completions(
                    *shell,
                    &mut Args::command(),
                    &mut io::stdout().lock(),
                );
            }
            GenerateCommand::Man { output_dir } => {
                for page in commands::generate::generate_man_pages(
                    &Args::command(),
                    output_dir.clone(),
                )? {
                    println!("Generated: {}", page.display());
                }
            }
        },
        None => run(&args)?,
    }

    Ok(())
}

/// Tokenize the input and display the selected value.
fn run(args: &Args) -> Result<()> {
    let options = args.options();
    debug!("parse options: {options:?}");

    let document = if let Some(path) = &args.input {
        jsonsel::parse_file(path, options)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        if io::stdin().is_terminal() {
            // No piped input and no file specified
            let mut cmd = Args::command();
            return Ok(cmd.print_help()?);
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read STDIN")?;
        Document::parse_with_label(&buffer, "<stdin>", options)
            .context("Failed to parse JSON")?
    };
    debug!(
        "tokenized {} into {} tokens",
        document.label(),
        document.token_count()
    );

    let path = args.path.as_deref().unwrap_or_default();
    let selected = utils::select(document.root(), path)
        .with_context(|| format!("Failed to select {path:?}"))?;

    if args.count {
        println!("Tokens: {}", selected.child_count() + 1);
    }
    if args.depth {
        println!("Depth: {}", utils::depth(selected));
    }

    let mut stdout = io::stdout().lock();
    if args.tokens {
        utils::write_token_table(&mut stdout, selected, args.json_lines)?;
    } else if !args.no_display {
        utils::write_colored_result(
            &mut stdout,
            selected,
            path,
            !args.compact,
            true,
        )?;
    }

    Ok(())
}
