//! `tern`: run a script file, an inline script, or an interactive prompt.

fn main() {
    ternc::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let status = match ternc::parse_args(&args) {
        Ok(invocation) => ternc::run(invocation),
        Err(err) => {
            eprintln!("tern: {err}");
            eprintln!();
            eprint!("{}", ternc::USAGE);
            2
        }
    };
    std::process::exit(status);
}
