// src/main.rs
//
// draftmark: model-drafted blog text → styled HTML
//
// Subcommands:
//   coerce   : plain text → <h3>/<p>/<ul><li> (input that already has block tags is kept)
//   annotate : HTML → HTML with default presentation classes merged into each known tag
//   render   : coerce, then annotate
//   draft    : raw model output → normalized draft record JSON, body rendered to HTML
//
// I/O: INPUT "-" reads stdin; OUTPUT omitted or "-" writes stdout.
//
// CLI flags:
//   --class-map FILE : JSON object of tag → classes, merged over the defaults
//   -v, --verbose    : log more (-v info, -vv debug, -vvv trace); RUST_LOG wins if set

use clap::{ArgAction, Args, Parser, Subcommand};
use draftmark::{coerce, Annotator, ClassMap, DraftResponse, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log more; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Coerce plain text into <h3>/<p>/<ul> HTML
    Coerce(Files),
    /// Merge default presentation classes into HTML
    Annotate(Styled),
    /// Coerce, then annotate
    Render(Styled),
    /// Normalize raw model output into a draft record (JSON)
    Draft(Styled),
}

#[derive(Args)]
struct Files {
    /// Input file ("-" for stdin)
    input: PathBuf,

    /// Output file (default: stdout)
    output: Option<PathBuf>,
}

#[derive(Args)]
struct Styled {
    /// JSON object of tag → classes, merged over the defaults
    #[arg(long = "class-map", value_name = "FILE")]
    class_map: Option<PathBuf>,

    #[command(flatten)]
    files: Files,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("draftmark: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Coerce(files) => {
            let src = read_input(&files.input)?;
            write_output(files.output.as_deref(), &coerce(&src))
        }
        Command::Annotate(styled) => {
            let annotator = annotator(styled.class_map.as_deref())?;
            let src = read_input(&styled.files.input)?;
            write_output(styled.files.output.as_deref(), &annotator.annotate(&src))
        }
        Command::Render(styled) => {
            let annotator = annotator(styled.class_map.as_deref())?;
            let src = read_input(&styled.files.input)?;
            write_output(styled.files.output.as_deref(), &annotator.render(&src))
        }
        Command::Draft(styled) => {
            let annotator = annotator(styled.class_map.as_deref())?;
            let src = read_input(&styled.files.input)?;
            let response = DraftResponse::from_model_output(&src, &annotator);
            let mut json = serde_json::to_string_pretty(&response)?;
            json.push('\n');
            write_output(styled.files.output.as_deref(), &json)
        }
    }
}

fn annotator(class_map: Option<&Path>) -> Result<Annotator> {
    let classes = match class_map {
        Some(path) => ClassMap::load(path)?,
        None => ClassMap::default(),
    };
    Ok(Annotator::new(classes))
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdio(path) {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        return Ok(src);
    }
    let src = fs::read_to_string(path)?;
    log::info!("read {} bytes from {}", src.len(), path.display());
    Ok(src)
}

fn write_output(path: Option<&Path>, out: &str) -> Result<()> {
    match path {
        Some(path) if !is_stdio(path) => {
            fs::write(path, out)?;
            log::info!("wrote {} bytes to {}", out.len(), path.display());
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(out.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
