use clap::Parser;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "sicc",
    version,
    about = "s-expression to C transpiler with source-line tracking"
)]
struct Cli {
    /// Input .sic source file
    input: PathBuf,
    /// Output .c file
    output: PathBuf,
    /// Print the parsed tree with source spans instead of transpiling
    #[arg(long)]
    dump_tree: bool,
}

fn main() {
    let cli = Cli::parse();

    let source = match std::fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };
    let filename = cli.input.display().to_string();

    if cli.dump_tree {
        match sicc::parse_source(&source, &filename) {
            Ok(forest) => print!("{}", sicc::ast::dump_forest(&forest)),
            Err(_) => process::exit(1),
        }
        return;
    }

    let lines = match sicc::transpile_source(&source, &filename) {
        Ok(lines) => lines,
        Err(_) => process::exit(1),
    };

    // The output file is only touched once generation fully succeeded.
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    if let Err(e) = std::fs::write(&cli.output, &text) {
        eprintln!("error: cannot write '{}': {}", cli.output.display(), e);
        process::exit(1);
    }
    eprintln!("Transpiled -> {}", cli.output.display());
}
