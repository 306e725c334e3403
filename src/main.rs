fn main() {
    if let Err(err) = csvtool::run() {
        eprintln!("{} {err}", csvtool::TOOL_TAG);
        std::process::exit(err.exit_code());
    }
}
