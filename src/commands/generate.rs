//! `generate` subcommand: shell completions and man pages.
use anyhow::{Context, Result};
use clap_complete::Shell;
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write completions of `cmd` for `shell` to `writer`.
pub fn write_completions<W: Write>(
    shell: Shell,
    cmd: &mut clap::Command,
    writer: &mut W,
) {
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, name, writer);
}

/// Render one man page of `cmd` into `output_dir`, returning the path of
/// the created file.
fn render_man_page(cmd: clap::Command, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.1", cmd.get_name()));
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    clap_mangen::Man::new(cmd)
        .render(&mut file)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("generated {}", path.display());
    Ok(path)
}

/// Generate man pages for `cmd` and all its nested subcommands into
/// `output_dir`, or the current directory if not given. Subcommand pages are
/// named after their full command path, e.g. `jsel-generate-man.1`.
///
/// Returns the paths of the generated pages, parents before children.
///
/// # Errors
///
/// Returns an error if the output directory or one of the pages could not be
/// created.
pub fn generate_man_pages(
    cmd: &clap::Command,
    output_dir: Option<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Opening current directory")?,
    };
    std::fs::create_dir_all(&output_dir)
        .context("create output Man directories")?;

    let mut generated = vec![render_man_page(cmd.clone(), &output_dir)?];
    // stack of (parent page name, subcommand), popped in declaration order
    let mut pending: Vec<(String, &clap::Command)> = cmd
        .get_subcommands()
        .map(|subcmd| (cmd.get_name().to_string(), subcmd))
        .collect();
    pending.reverse();

    while let Some((prefix, subcmd)) = pending.pop() {
        let name = format!("{prefix}-{}", subcmd.get_name());
        // clap_mangen takes the page title from the command name, which
        // clap only accepts as a 'static str
        let leaked: &'static str = Box::leak(name.clone().into_boxed_str());
        let renamed = subcmd
            .clone()
            .name(leaked)
            .disable_help_subcommand(true);
        generated.push(render_man_page(renamed, &output_dir)?);

        let start = pending.len();
        pending.extend(
            subcmd.get_subcommands().map(|nested| (name.clone(), nested)),
        );
        pending[start..].reverse();
    }

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Command, CommandFactory as _, Parser, Subcommand};

    #[derive(Parser)]
    #[command(name = "tool")]
    struct Tool {
        #[command(subcommand)]
        command: Outer,
    }

    #[derive(Subcommand)]
    enum Outer {
        #[command(subcommand)]
        Make(Inner),
        Check,
    }

    #[derive(Subcommand)]
    enum Inner {
        Docs,
    }

    #[test]
    fn test_man_pages_for_nested_subcommands() {
        let dir = tempfile::tempdir().unwrap();
        let pages =
            generate_man_pages(&Tool::command(), Some(dir.path().into()))
                .unwrap();
        let names: Vec<String> = pages
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into())
            .collect();
        assert_eq!(
            names,
            vec!["tool.1", "tool-make.1", "tool-make-docs.1", "tool-check.1"]
        );
        assert!(pages.iter().all(|path| path.exists()));
    }

    #[test]
    fn test_completions_mention_binary() {
        let mut cmd = Command::new("tool").subcommand(Command::new("check"));
        let mut output = Vec::new();
        write_completions(Shell::Bash, &mut cmd, &mut output);
        let script = String::from_utf8(output).unwrap();
        assert!(script.contains("tool"));
        assert!(script.contains("check"));
    }
}
