fn main() {
    if let Err(err) = toyset_pipeline::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
