fn main() {
    if let Err(err) = lasercut_panels::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
