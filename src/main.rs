fn main() {
    if let Err(e) = chatbox::cli::main() {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}
