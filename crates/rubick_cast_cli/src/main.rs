//! rubick-format: Rubick CAST import-format converter

use clap::Parser;
use rubick_cast_cli::cli::Args;

fn main() {
    let args = Args::parse();

    match rubick_cast_cli::run(args) {
        Ok(c_summary) => println!("{c_summary}"),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}
