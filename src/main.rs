use std::process;

fn main() {
    if let Err(err) = chatloop::cli::main() {
        eprintln!("❌ Error: {err}");
        process::exit(1);
    }
}
