use anyhow::{Result, ensure};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use litevcs::diff::{DiffOp, FileDiff};
use litevcs::index::TrackOutcome;
use litevcs::repo::{InitOutcome, Repository};
use litevcs::VcsError;
use std::env;

#[derive(Parser, Debug)]
#[command(name = "litevcs", about = "A minimal version-control engine")]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty repository in the current directory
    Init,
    /// Add a file to the staging index
    Track { file: String },
    /// Snapshot all tracked files as a new commit
    Save { message: String },
    /// List commits from HEAD back to the root
    History,
    /// Restore the working tree to a commit (full hash or unique prefix)
    Go { hash: String },
    /// Compare HEAD's snapshot against the working tree
    Diff {
        #[clap(long)]
        smart: bool,
        #[clap(long)]
        ignore_empty: bool,
        #[clap(long)]
        ignore_whitespace: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let repo = Repository::new(env::current_dir()?);
    match args.command {
        Command::Init => match repo.init()? {
            InitOutcome::Initialized => println!("Initialized empty LiteVCS repository."),
            InitOutcome::AlreadyInitialized => println!("Repository already initialized."),
        },
        Command::Track { file } => match repo.track(&file)? {
            TrackOutcome::Tracked(path) => println!("Tracked: {path}"),
            TrackOutcome::AlreadyTracked(path) => println!("Already tracked: {path}"),
        },
        Command::Save { message } => {
            let digest = repo.save(&message)?;
            println!("Saved commit: {}...", &digest[..8]);
        }
        Command::History => {
            for entry in repo.history()? {
                println!("commit {}", &entry.digest[..8.min(entry.digest.len())]);
                match Local.timestamp_opt(entry.time, 0).single() {
                    Some(date) => println!("Date: {}", date.format("%Y-%m-%d %H:%M:%S")),
                    None => println!("Date: {}", entry.time),
                }
                println!("Message: {}\n", entry.message);
            }
        }
        Command::Go { hash } => {
            // the core only prefix-matches; the character set is checked here
            ensure!(
                !hash.is_empty()
                    && hash.len() <= 40
                    && hash.chars().all(|c| c.is_ascii_hexdigit()),
                "commit hash must be 1-40 hex characters"
            );
            let resolved = repo.go_to_commit(&hash)?;
            println!("Moved to commit {}", &resolved[..8]);
        }
        Command::Diff {
            smart,
            ignore_empty,
            ignore_whitespace,
        } => {
            if smart {
                print_smart_diff(&repo, ignore_empty, ignore_whitespace)?;
            } else {
                print_diff(&repo, ignore_empty, ignore_whitespace)?;
            }
        }
    }
    Ok(())
}

fn print_diff(repo: &Repository, ignore_empty: bool, ignore_whitespace: bool) -> Result<()> {
    let report = match repo.diff(ignore_empty, ignore_whitespace) {
        Ok(report) => report,
        Err(VcsError::NoCommits) => {
            println!("No commits to compare against.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if report.files.is_empty() {
        println!("No changes detected.");
        return Ok(());
    }
    for file in report.files {
        match file {
            FileDiff::Deleted { path } => {
                println!("diff -- {path}");
                println!("- (file deleted)\n");
            }
            FileDiff::Corrupt { path } => {
                println!("diff -- {path}");
                println!("(corrupt blob object, comparison skipped)\n");
            }
            FileDiff::Changed { path, entries } => {
                println!("diff -- {path}");
                for entry in entries {
                    let sign = match entry.op {
                        DiffOp::Delete => '-',
                        DiffOp::Insert => '+',
                    };
                    println!("{sign} {}", entry.text);
                }
                println!();
            }
        }
    }
    Ok(())
}

fn print_smart_diff(repo: &Repository, ignore_empty: bool, ignore_whitespace: bool) -> Result<()> {
    let report = match repo.diff_smart(ignore_empty, ignore_whitespace) {
        Ok(report) => report,
        Err(VcsError::NoCommits) => {
            println!("No commits to compare against.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if report.files.is_empty() {
        println!("No meaningful changes detected.");
        return Ok(());
    }
    for file in report.files {
        println!("smart diff -- {}", file.path);
        for name in file.functions {
            println!("  modified function: {name}");
        }
        println!();
    }
    Ok(())
}
