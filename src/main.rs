fn main() {
    env_logger::init();
    if let Err(err) = flow_canvas::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
