fn main() {
    if let Err(e) = atlas_chat::cli::main() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
