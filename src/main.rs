fn main() {
    if let Err(err) = lto_label::run() {
        eprintln!("Generation failed: {err:#}");
        std::process::exit(1);
    }
}
