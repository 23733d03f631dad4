//! VFS CLI - Build an in-memory tree and run commands against it.
//!
//! Usage:
//!   vfs [options] [commands...]
//!
//! Examples:
//!   vfs -a "write docs/a.txt hello" "cat docs/a.txt"   # auto-create, write, read back
//!   vfs -m tree.json tree                              # seed from a manifest, render it
//!   vfs -c vfs.json --export < script.txt              # run a script, print JSON snapshot

use std::error::Error;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use log::debug;

use vfs_core::{load_manifest_from_path, snapshot, Drive, Node, VfsConfig};

/// Virtual filesystem CLI
#[derive(Parser, Debug)]
#[command(name = "vfs")]
#[command(about = "Run commands against an in-memory filesystem")]
struct Args {
    /// Drive configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tree manifest (JSON) to seed the drive with
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Drive name (overrides the configuration)
    #[arg(short, long)]
    drive: Option<String>,

    /// Create missing path segments instead of failing
    #[arg(short, long)]
    auto_create: bool,

    /// Enable trace logging
    #[arg(short, long)]
    trace: bool,

    /// Print the final tree as a JSON manifest instead of rendering it
    #[arg(long)]
    export: bool,

    /// Commands to run (read from stdin, one per line, when none are given)
    commands: Vec<String>,
}

/// A single filesystem command.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Mkdir(String),
    Touch(String),
    Write(String, String),
    Cat(String),
    Truncate(String),
    Close(String),
    Ls(String),
    Tree,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (op, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let (path, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let path = path.to_string();

        let needs_path = |cmd: Command| {
            if path.is_empty() {
                Err(format!("{}: missing path", op))
            } else {
                Ok(cmd)
            }
        };

        match op {
            "mkdir" => needs_path(Command::Mkdir(path.clone())),
            "touch" => needs_path(Command::Touch(path.clone())),
            "write" => needs_path(Command::Write(path.clone(), text.to_string())),
            "cat" => needs_path(Command::Cat(path.clone())),
            "truncate" => needs_path(Command::Truncate(path.clone())),
            "close" => needs_path(Command::Close(path.clone())),
            "ls" => Ok(Command::Ls(path.clone())),
            "tree" => Ok(Command::Tree),
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

/// Run one command against `drive`, writing any output to `out`.
fn run_command<W: Write>(
    drive: &Drive,
    command: &Command,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    debug!("run {:?}", command);
    match command {
        Command::Mkdir(path) => {
            drive.open_directory(path)?;
        }
        Command::Touch(path) => {
            drive.open_file(path)?;
        }
        Command::Write(path, text) => {
            drive.open_file(path)?.write(text.as_str())?;
        }
        Command::Cat(path) => {
            let content = drive.open_file(path)?.read()?;
            writeln!(out, "{}", String::from_utf8_lossy(content.as_bytes()))?;
        }
        Command::Truncate(path) => {
            drive.open_file(path)?.truncate()?;
        }
        Command::Close(path) => {
            drive.open_file(path)?.close()?;
        }
        Command::Ls(path) => {
            let dir = drive.open_directory(path)?;
            for child in dir.children() {
                writeln!(out, "{}", describe(&child))?;
            }
        }
        Command::Tree => {
            for line in drive.render() {
                writeln!(out, "{}", line)?;
            }
        }
    }
    Ok(())
}

/// One-line description of a node, as in the first rendered line.
fn describe(node: &Node) -> String {
    format!("{}.{}", node.kind().label(), node.name())
}

/// Build the drive from configuration, flags and manifest.
fn build_drive(args: &Args) -> Result<Drive, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => VfsConfig::from_path(path)?,
        None => VfsConfig::default(),
    };
    if let Some(name) = &args.drive {
        config.drive = name.clone();
    }
    if args.auto_create {
        config.auto_create = true;
    }

    let drive = Drive::from_config(&config);
    if let Some(path) = &args.manifest {
        let manifest = load_manifest_from_path(path)?;
        manifest.apply_to(&drive)?;
        eprintln!(
            "Loaded manifest: {} ({} entries)",
            path.display(),
            manifest.entries.len()
        );
    }
    Ok(drive)
}

/// Run every non-blank line as a command, then print the final tree (unless a
/// `tree` command already did) or its JSON snapshot. Returns the failure count.
fn run_script<W: Write>(
    drive: &Drive,
    lines: &[String],
    export: bool,
    out: &mut W,
) -> Result<usize, Box<dyn Error>> {
    let mut failed = 0;

    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let result = match Command::parse(line) {
            Ok(command) => run_command(drive, &command, out),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            eprintln!("{}: {}", line.trim(), e);
            failed += 1;
        }
    }

    let rendered = lines.iter().any(|l| l.trim() == "tree");
    if export {
        writeln!(out, "{}", snapshot(drive).to_json()?)?;
    } else if !rendered {
        for line in drive.render() {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(failed)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.trace { "trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let drive = build_drive(&args)?;

    // Commands from the command line, or one per stdin line
    let lines: Vec<String> = if args.commands.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<String>, _>>()?
    } else {
        args.commands.clone()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let failed = run_script(&drive, &lines, args.export, &mut out)?;

    if failed > 0 {
        return Err(format!("{} command(s) failed", failed).into());
    }
    Ok(())
}
