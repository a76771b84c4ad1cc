use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use oxacc::exec::evaluate_file;
use oxacc::report::RunReport;

#[derive(Parser)]
#[command(
    name = "oxacc",
    version,
    about = "Directive front end for gang/worker/vector parallel-region annotations"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and validate a .acc file without evaluating
    Check {
        /// Input .acc file
        input: PathBuf,
    },
    /// Print the effective shape at every observation point
    Resolve {
        /// Input .acc file
        input: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Evaluate observation points under the resolved shapes
    Run {
        /// Input .acc file
        input: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Save the run report to a JSON file
        #[arg(long, value_name = "PATH")]
        save_report: Option<PathBuf>,
        /// Expected match counts, in source order (exit 1 on mismatch)
        #[arg(long, value_name = "N", value_delimiter = ',')]
        expect: Vec<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Check { input } => cmd_check(&input),
        Command::Resolve { input, json } => cmd_resolve(&input, json),
        Command::Run {
            input,
            json,
            save_report,
            expect,
        } => cmd_run(&input, json, save_report, &expect),
    }
}

fn read_input(input: &Path) -> String {
    match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", input.display(), e);
            process::exit(1);
        }
    }
}

fn cmd_check(input: &Path) {
    let source = read_input(input);
    let filename = input.to_string_lossy();
    match oxacc::parse_source(&source, &filename) {
        Ok(file) => {
            let sites = evaluate_file(&file).len();
            println!(
                "{}: ok ({} region(s), {} observation point(s))",
                filename,
                file.regions.len(),
                sites
            );
        }
        Err(_) => process::exit(1),
    }
}

fn cmd_resolve(input: &Path, json: bool) {
    let report = build_report(input);
    if json {
        print!("{}", report.to_json());
        return;
    }
    for site in &report.sites {
        println!(
            "{}:{}: count {} where {} → {}",
            report.file, site.span.start, site.extent, site.predicate, site.shape
        );
    }
}

fn cmd_run(input: &Path, json: bool, save_report: Option<PathBuf>, expect: &[u64]) {
    let report = build_report(input);

    if let Some(ref path) = save_report {
        if let Err(e) = report.save_json(path) {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }

    if json {
        print!("{}", report.to_json());
    } else {
        for site in &report.sites {
            println!(
                "{}:{}: count {} where {} [{}] = {}",
                report.file, site.span.start, site.extent, site.predicate, site.shape, site.matches
            );
        }
    }

    if !expect.is_empty() {
        if expect.len() != report.sites.len() {
            eprintln!(
                "error: {} expected value(s) for {} observation point(s)",
                expect.len(),
                report.sites.len()
            );
            process::exit(1);
        }
        let mut failed = 0;
        for (site, &expected) in report.sites.iter().zip(expect) {
            if site.matches != expected {
                eprintln!(
                    "mismatch at {}:{}: expected {}, got {}",
                    report.file, site.span.start, expected, site.matches
                );
                failed += 1;
            }
        }
        if failed > 0 {
            process::exit(1);
        }
        println!("all {} observation point(s) match", report.sites.len());
    }
}

fn build_report(input: &Path) -> RunReport {
    let source = read_input(input);
    let filename = input.to_string_lossy().to_string();
    match oxacc::parse_source(&source, &filename) {
        Ok(file) => RunReport::new(filename, evaluate_file(&file)),
        Err(_) => process::exit(1),
    }
}
