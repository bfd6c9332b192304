fn main() {
    if let Err(err) = secuscan::cli::run() {
        if !secuscan::exit::is_reported(&err) {
            secuscan::ui::eprintln_error(&err);
        }
        std::process::exit(secuscan::exit::exit_code(&err));
    }
}
