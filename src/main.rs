use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use log::info;
use truss_statics::{
    parse_truss, render_report, solve_batch, SolveStatus, SolverOptions, Truss, TrussInput,
};

/// Command-line settings.
struct Arguments {
    /// Print JSON instead of the text report.
    json: bool,
    /// Numerical settings for every solve.
    options: SolverOptions,
    /// Input files in the order given.
    files: Vec<PathBuf>,
}

/// Read flags and input paths from the command line.
fn parse_arguments(args: impl IntoIterator<Item = String>) -> Result<Arguments> {
    let mut json = false;
    let mut options = SolverOptions::default();
    let mut files = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--tolerance" => {
                let value = args.next().context("--tolerance needs a value")?;
                options.tolerance = value
                    .parse()
                    .with_context(|| format!("`{value}` is not a valid tolerance"))?;
                options.validated()?;
            }
            "-h" | "--help" => bail!("usage: truss-statics [--json] [--tolerance <value>] <file>..."),
            _ => files.push(PathBuf::from(arg)),
        }
    }
    if files.is_empty() {
        bail!("usage: truss-statics [--json] [--tolerance <value>] <file>...");
    }
    Ok(Arguments {
        json,
        options,
        files,
    })
}

/// Read one input file, as JSON records or the keyword format.
fn load(path: &Path) -> Result<(TrussInput, Truss)> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let input: TrussInput = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&source)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        parse_truss(&source).with_context(|| format!("failed to parse {}", path.display()))?
    };
    let truss = input
        .build()
        .with_context(|| format!("invalid truss in {}", path.display()))?;
    Ok((input, truss))
}

/// Solve every input file and print its report. Returns whether all were determinate.
fn run() -> Result<bool> {
    let arguments = parse_arguments(std::env::args().skip(1))?;
    let loaded = arguments
        .files
        .iter()
        .map(|path| load(path))
        .collect::<Result<Vec<_>>>()?;
    let (inputs, trusses): (Vec<TrussInput>, Vec<Truss>) = loaded.into_iter().unzip();

    info!("solving {} truss(es)", trusses.len());
    let reports = solve_batch(&trusses, &arguments.options);

    let mut all_determinate = true;
    for (((path, input), truss), report) in arguments
        .files
        .iter()
        .zip(&inputs)
        .zip(&trusses)
        .zip(&reports)
    {
        all_determinate &= report.status == SolveStatus::Determinate;
        if arguments.json {
            let json = serde_json::to_string_pretty(report)
                .context("failed to serialise the analysis report")?;
            println!("{json}");
        } else {
            println!("== {}", path.display());
            println!("{}", render_report(input, truss, report));
        }
    }
    Ok(all_determinate)
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| (*arg).to_owned()).collect()
    }

    #[test]
    fn parses_flags_and_files() {
        let parsed = parse_arguments(args(&["--json", "--tolerance", "1e-6", "a.txt", "b.txt"]))
            .expect("valid arguments");
        assert!(parsed.json);
        assert_eq!(parsed.options.tolerance, 1.0e-6);
        assert_eq!(parsed.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn rejects_missing_files_and_bad_tolerances() {
        assert!(parse_arguments(args(&["--json"])).is_err());
        assert!(parse_arguments(args(&["--tolerance", "-1", "a.txt"])).is_err());
        assert!(parse_arguments(args(&["--tolerance"])).is_err());
    }

    #[test]
    fn loads_the_demo_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/warren.txt");
        let (input, truss) = load(&path).expect("demo loads");
        assert_eq!(input.title.as_deref(), Some("Warren Truss"));
        assert_eq!(truss.joint_count(), 5);
        assert_eq!(truss.member_count(), 7);
    }
}
