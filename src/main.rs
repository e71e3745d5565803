use std::io;

fn main() {
    // UCI responses go to stdout; env_logger's default target is stderr,
    // so the two streams never collide. Controlled by `RUST_LOG`.
    env_logger::init();
    let stdin = io::stdin();
    uci_engine::uci::run(stdin.lock());
}
