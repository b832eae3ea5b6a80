fn main() {
    if let Err(err) = csv_analyzer::run() {
        std::process::exit(csv_analyzer::report_failure(&err));
    }
}
