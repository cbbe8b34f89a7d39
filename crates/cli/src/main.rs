fn main() {
    if let Err(e) = scalarize_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
