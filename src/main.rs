use std::process::ExitCode;
use clap::Parser as ClapParser;
use brash::Config;

fn main() -> ExitCode {
    let config: Config = Config::parse();

    match brash::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        },
    }
}
