// Command-line shell around the diff engine.
//
// Uses explicit subcommands and long-form options.  Every input is read
// fully before any output is produced; decoded output is only written once
// the whole diff has applied cleanly.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::diff::InstructionIterator;
use crate::diff::decoder::{DecodeOptions, DiffDecoder};
use crate::engine::{self, EncodeOptions};
use crate::hash::config::{DEFAULT_BUCKET_CAP, IndexConfig, MIN_BUCKETS, SEQ_LEN};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Greedy ADD/COPY diff encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "seqdelta",
    version,
    about = "ADD/COPY text diff encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compute the diff from an old file to a new input.
    Encode(EncodeArgs),
    /// Apply a diff to an old file.
    Decode(DecodeArgs),
    /// List the instructions of a diff.
    Print(PrintArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Old file to copy from (default: empty).
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    old: Option<PathBuf>,

    /// New input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Maximum index entries per hash bucket.
    #[arg(long = "bucket-cap", default_value_t = DEFAULT_BUCKET_CAP)]
    bucket_cap: usize,

    /// Let index buckets grow without bound.
    #[arg(long = "unbounded-buckets", conflicts_with = "bucket_cap")]
    unbounded: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Old file to copy from (default: empty).
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    old: Option<PathBuf>,

    /// Input diff file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Reject COPY instructions that run past the end of the old file.
    #[arg(long = "strict-copy")]
    strict_copy: bool,

    /// Check only (validate the diff, do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// Diff input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Print,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    no_output: bool,
    json_output: bool,
    bucket_cap: Option<usize>,
    strict_copy: bool,
    old_file: Option<PathBuf>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

impl Options {
    fn new(command: Command, cli: &Cli) -> Self {
        Self {
            command,
            use_stdout: false,
            force: cli.force,
            quiet: cli.quiet,
            verbose: cli.verbose.min(2),
            no_output: false,
            json_output: cli.json_output,
            bucket_cap: Some(DEFAULT_BUCKET_CAP),
            strict_copy: false,
            old_file: None,
            input_file: None,
            output_file: None,
        }
    }
}

fn resolve_options(cli: Cli) -> Options {
    match &cli.command {
        Cmd::Encode(args) => Options {
            use_stdout: args.stdout,
            no_output: args.no_output,
            bucket_cap: (!args.unbounded).then_some(args.bucket_cap),
            old_file: args.old.clone(),
            input_file: args.input.clone().or_else(|| args.input_pos.clone()),
            output_file: args.output.clone().or_else(|| args.output_pos.clone()),
            ..Options::new(Command::Encode, &cli)
        },
        Cmd::Decode(args) => Options {
            use_stdout: args.stdout,
            no_output: args.no_output,
            strict_copy: args.strict_copy,
            old_file: args.old.clone(),
            input_file: args.input.clone().or_else(|| args.input_pos.clone()),
            output_file: args.output.clone().or_else(|| args.output_pos.clone()),
            ..Options::new(Command::Decode, &cli)
        },
        Cmd::Print(args) => Options {
            input_file: Some(args.input.clone()),
            ..Options::new(Command::Print, &cli)
        },
        Cmd::Config => Options::new(Command::Config, &cli),
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("seqdelta".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Stream helpers
// ---------------------------------------------------------------------------

fn read_old(opts: &Options) -> Result<Vec<u8>, String> {
    match &opts.old_file {
        Some(path) => std::fs::read(path).map_err(|e| format!("old file: {}: {e}", path.display())),
        None => Ok(Vec::new()),
    }
}

fn read_input(opts: &Options) -> Result<Vec<u8>, String> {
    let mut data = Vec::new();
    match &opts.input_file {
        Some(path) => {
            let mut f = File::open(path).map_err(|e| format!("input file: {}: {e}", path.display()))?;
            f.read_to_end(&mut data)
                .map_err(|e| format!("input file: {}: {e}", path.display()))?;
        }
        None => {
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .map_err(|e| format!("read error: {e}"))?;
        }
    }
    Ok(data)
}

fn open_output(opts: &Options) -> Result<Box<dyn Write>, String> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            if path.exists() && !opts.force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    path.display()
                ));
            }
            let f = File::create(path).map_err(|e| format!("output file: {}: {e}", path.display()))?;
            Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f)))
        }
    }
}

fn fail(msg: impl std::fmt::Display) -> i32 {
    eprintln!("seqdelta: {msg}");
    1
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("seqdelta version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("SEQ_LEN={SEQ_LEN}");
    eprintln!("DEFAULT_BUCKET_CAP={DEFAULT_BUCKET_CAP}");
    eprintln!("MIN_BUCKETS={MIN_BUCKETS}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn encode_options(opts: &Options) -> EncodeOptions {
    EncodeOptions {
        index: IndexConfig {
            bucket_cap: opts.bucket_cap,
        },
    }
}

fn cmd_encode(opts: &Options) -> i32 {
    let old = match read_old(opts) {
        Ok(data) => data,
        Err(e) => return fail(e),
    };
    let new = match read_input(opts) {
        Ok(data) => data,
        Err(e) => return fail(e),
    };

    let writer: Box<dyn Write> = if opts.no_output {
        Box::new(io::sink())
    } else {
        match open_output(opts) {
            Ok(w) => w,
            Err(e) => return fail(e),
        }
    };

    let stats = match engine::encode_to(&old, &new, writer, &encode_options(opts)) {
        Ok((_, stats)) => stats,
        Err(e) => return fail(format!("encode error: {e}")),
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "seqdelta: encoder: old size: {}, new size: {}, diff size: {}, \
             ADD: {}, COPY: {}, dropped index entries: {}",
            stats.old_size, stats.new_size, stats.diff_size, stats.adds, stats.copies, stats.dropped
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "encode",
            "old_size": stats.old_size,
            "new_size": stats.new_size,
            "diff_size": stats.diff_size,
            "adds": stats.adds,
            "copies": stats.copies,
            "literal_bytes": stats.literal_bytes,
            "copied_bytes": stats.copied_bytes,
            "indexed": stats.indexed,
            "dropped": stats.dropped,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let old = match read_old(opts) {
        Ok(data) => data,
        Err(e) => return fail(e),
    };
    let diff = match read_input(opts) {
        Ok(data) => data,
        Err(e) => return fail(e),
    };

    let mut decoder = DiffDecoder::with_options(
        &old,
        DecodeOptions {
            strict_copy_bounds: opts.strict_copy,
        },
    );
    let output = match decoder.decode(&diff) {
        Ok(out) => out,
        Err(e) => return fail(format!("decode error: {e}")),
    };

    if !opts.no_output {
        let mut writer = match open_output(opts) {
            Ok(w) => w,
            Err(e) => return fail(e),
        };
        if let Err(e) = writer.write_all(&output).and_then(|()| writer.flush()) {
            return fail(format!("write error: {e}"));
        }
    }

    let stats = decoder.stats();
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "seqdelta: decoder: output size: {}, ADD: {}, COPY: {}, truncated COPY: {}",
            output.len(),
            stats.adds,
            stats.copies,
            stats.truncated_copies
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "old_size": old.len(),
            "diff_size": diff.len(),
            "output_size": output.len(),
            "adds": stats.adds,
            "copies": stats.copies,
            "truncated_copies": stats.truncated_copies,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Print command
// ---------------------------------------------------------------------------

fn print_diff(path: &Path, out: &mut dyn Write) -> Result<(), String> {
    let diff = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let io_err = |e: io::Error| format!("write error: {e}");

    writeln!(out, "  Offset Instruction").map_err(io_err)?;
    let mut offset = 0u64;
    for result in InstructionIterator::new(&diff) {
        let inst = result.map_err(|e| format!("instruction decode: {e}"))?;
        writeln!(out, "  {offset:06} {inst}").map_err(io_err)?;
        offset += inst.len() as u64;
    }
    writeln!(out, "  {offset:06} END").map_err(io_err)?;
    out.flush().map_err(io_err)
}

fn cmd_print(opts: &Options) -> i32 {
    let Some(path) = &opts.input_file else {
        return fail("print requires an input file");
    };
    let mut stdout = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
    match print_diff(path, &mut stdout) {
        Ok(()) => 0,
        Err(e) => fail(e),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout
        && !opts.quiet
        && let Some(path) = &opts.output_file
    {
        eprintln!(
            "seqdelta: warning: -c option overrides output filename: {}",
            path.display()
        );
    }
    if opts.use_stdout {
        opts.output_file = None;
    }

    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Print => cmd_print(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("seqdelta".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn encode_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "encode",
            "--old",
            "old.bin",
            "--bucket-cap",
            "7",
            "new.bin",
            "out.diff",
        ]);
        assert_eq!(opts.command, Command::Encode);
        assert_eq!(opts.old_file.as_deref(), Some(Path::new("old.bin")));
        assert_eq!(opts.input_file, Some(PathBuf::from("new.bin")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.diff")));
        assert_eq!(opts.bucket_cap, Some(7));
        assert_eq!(encode_options(&opts).index, IndexConfig::with_cap(7));
    }

    #[test]
    fn encode_defaults() {
        let opts = parse_opts(&["encode"]);
        assert_eq!(opts.bucket_cap, Some(DEFAULT_BUCKET_CAP));
        assert!(opts.old_file.is_none());
        assert!(opts.input_file.is_none());
        assert!(opts.output_file.is_none());
    }

    #[test]
    fn unbounded_buckets() {
        let opts = parse_opts(&["encode", "--unbounded-buckets", "in"]);
        assert_eq!(opts.bucket_cap, None);
        assert!(Cli::try_parse_from(["seqdelta", "encode", "--unbounded-buckets", "--bucket-cap", "3"]).is_err());
    }

    #[test]
    fn decode_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "--quiet",
            "decode",
            "-s",
            "old.bin",
            "--strict-copy",
            "--check-only",
            "--input",
            "in.diff",
            "--output",
            "out.bin",
        ]);
        assert_eq!(opts.command, Command::Decode);
        assert!(opts.strict_copy);
        assert!(opts.no_output);
        assert!(opts.quiet);
        assert_eq!(opts.old_file.as_deref(), Some(Path::new("old.bin")));
        assert_eq!(opts.input_file, Some(PathBuf::from("in.diff")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.bin")));
    }

    #[test]
    fn global_stdio_and_force_flags() {
        let opts = parse_opts(&["--force", "encode", "--stdout", "in", "out"]);
        assert!(opts.use_stdout);
        assert!(opts.force);
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["-vvv", "encode", "in", "out"]);
        assert_eq!(opts.verbose, 2);
        assert_eq!(default_log_filter(opts.verbose), "trace");
        assert_eq!(default_log_filter(0), "warn");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["seqdelta", "-q", "-v", "config"]).is_err());
    }

    #[test]
    fn print_and_config_map() {
        let opts = parse_opts(&["print", "d.diff"]);
        assert_eq!(opts.command, Command::Print);
        assert_eq!(opts.input_file, Some(PathBuf::from("d.diff")));
        assert_eq!(parse_opts(&["config"]).command, Command::Config);
    }

    #[test]
    fn print_lists_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.diff");
        std::fs::write(&path, b"C10,0A3:XYZ").unwrap();
        let mut out = Vec::new();
        print_diff(&path, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "  000000 COPY     10 @0");
        assert_eq!(lines[2], "  000010 ADD       3 \"XYZ\"");
        assert_eq!(lines[3], "  000013 END");
    }

    #[test]
    fn print_reports_bad_diff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.diff");
        std::fs::write(&path, b"A1:xQ").unwrap();
        let mut out = Vec::new();
        assert!(print_diff(&path, &mut out).is_err());
    }

    #[test]
    fn fuzz_entry_tolerates_garbage() {
        fuzz_try_parse_args(&["--nope".to_string()]);
        fuzz_try_parse_args(&["encode".to_string(), "--bucket-cap".to_string(), "x".to_string()]);
    }
}
