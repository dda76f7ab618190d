fn main() {
    if let Err(err) = focusloop_lib::run() {
        eprintln!("focusloop: {:#}", err);
        std::process::exit(1);
    }
}
