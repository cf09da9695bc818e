use std::io::Write;

fn main() {
    // stdout carries the protocol, so diagnostics go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    chess_search::board::init();
    chess_search::uci::run_uci_loop();
}
