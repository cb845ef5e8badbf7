use std::{env, fs, process::ExitCode};

use volt::StdIo;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1) else {
        eprintln!("usage: volt <script.volt>");
        return ExitCode::FAILURE;
    };

    let source = match read_file(file_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut sink = StdIo;
    let mut input = StdIo;
    match volt::run_source(&source, &mut sink, &mut input, None) {
        Ok(_) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn read_file(file_path: &str) -> Result<String, String> {
    fs::read_to_string(file_path).map_err(|err| format!("reading {file_path}: {err}"))
}
