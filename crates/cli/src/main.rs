use std::path::{Path, PathBuf};
use std::{fs, io, process};

use clap::Parser;
use tscop_cli::report::ScheduleReport;
use tscop_cli::{App, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let app = App::parse();
    match &app.command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate(args),
        Command::Fmt(args) => fmt(args),
        Command::Schema => schema(),
    }
}

fn run(args: &tscop_cli::RunArgs) {
    let stdout = io::stdout().lock();
    if let Err(e) = tscop_cli::run::run_files(args, stdout) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn generate(args: &tscop_cli::GenerateArgs) {
    if args.n_object == 0 || args.n_transaction == 0 || args.max_timestamp < 0 {
        eprintln!("--n-object and --n-transaction must be positive, --max-timestamp non-negative");
        process::exit(1);
    }

    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output directory: {e}");
        process::exit(1);
    });

    let params = tscop_testgen::generator::WorkloadParams::from(args);
    let workloads = tscop_testgen::generator::generate_mult_workloads(args.n_workload, &params);

    for workload in &workloads {
        let path = args.output_dir.join(format!("{}.txt", workload.get_id()));
        fs::write(&path, workload.to_input()).unwrap_or_else(|e| {
            eprintln!("Failed to write {}: {e}", path.display());
            process::exit(1);
        });
    }

    println!(
        "Generated {} input files to {}",
        workloads.len(),
        args.output_dir.display()
    );
}

fn input_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .unwrap_or_else(|e| {
                    eprintln!("Failed to read {}: {e}", path.display());
                    process::exit(1);
                })
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn fmt(args: &tscop_cli::FmtArgs) {
    let mut any_unformatted = false;

    for path in input_files(&args.paths) {
        let input = read(&path);
        let formatted = tscop_parser::format_input(&input);
        if formatted == input {
            continue;
        }
        if args.check {
            println!("{}: not formatted", path.display());
            any_unformatted = true;
        } else {
            fs::write(&path, formatted).unwrap_or_else(|e| {
                eprintln!("Failed to write {}: {e}", path.display());
                process::exit(1);
            });
            println!("{}: formatted", path.display());
        }
    }

    if any_unformatted {
        process::exit(1);
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {e}", path.display());
        process::exit(1);
    })
}

fn schema() {
    let schema = schemars::schema_for!(ScheduleReport);
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to encode schema: {e}");
            process::exit(1);
        }
    }
}
