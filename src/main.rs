#![allow(nonstandard_style)]

use clap::Parser;
use scratchpad_calc::{LineResult, Session};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Scratchpad calculator: evaluates a buffer line by line and prints one
/// result per input line.
///
/// Input is split like a text file: a final line break ends the last line
/// and does not add an empty one, so `1\n` and `1` both print one result.
/// Editors that need the trailing empty line use `Session::evaluate_text`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Read the buffer from this file instead of stdin.
    file: Option<PathBuf>,

    /// Print assignment results as `name = value`.
    #[arg(short = 'n', long)]
    show_names: bool,

    /// Prompt for lines, re-evaluating the whole buffer after each one.
    #[arg(short, long)]
    interactive: bool,

    /// Exit with a failure status when any line fails to evaluate.
    #[arg(short, long)]
    strict: bool,

    /// Report failing lines on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn format_result(result: &LineResult, show_names: bool) -> String {
    match result {
        LineResult::value{rendered, assigned: Some(name)} if show_names => format!("{name} = {rendered}"),
        _ => result.rendered().to_string(),
    }
}

fn report(number: usize, result: &LineResult) {
    if let LineResult::error{message, detail} = result {
        match detail {
            Some(detail) => eprintln!("line {number}: {message}: {detail}"),
            None => eprintln!("line {number}: {message}"),
        }
    }
}

fn read_buffer(file: Option<&PathBuf>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        },
    }
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

fn run_interactive(args: &Args) -> std::io::Result<bool> {
    let mut session = Session::new();
    let mut buffer = Vec::<String>::new();
    let mut failed = false;

    prompt()?;
    for line in std::io::stdin().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        buffer.push(line);

        let results = session.evaluate_buffer(&buffer);
        if let Some(result) = results.last() {
            println!("{}", format_result(result, args.show_names));
            if args.verbose {
                report(results.len(), result);
            }
            failed |= result.is_error();
        }
        prompt()?;
    }
    Ok(failed)
}

fn run_batch(args: &Args) -> std::io::Result<bool> {
    let text = read_buffer(args.file.as_ref())?;
    let results = Session::new().evaluate_buffer(text.lines());

    for (index, result) in results.iter().enumerate() {
        println!("{}", format_result(result, args.show_names));
        if args.verbose {
            report(index + 1, result);
        }
    }
    Ok(results.iter().any(LineResult::is_error))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let outcome = if args.interactive { run_interactive(&args) } else { run_batch(&args) };
    match outcome {
        Ok(failed) if failed && args.strict => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to read the input: {e}");
            ExitCode::FAILURE
        },
    }
}
