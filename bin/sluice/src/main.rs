fn main() {
    if let Err(err) = sluice::cli::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
