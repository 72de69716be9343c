use std::io::Write;
use std::process::ExitCode;

use env_logger::Env;

mod block_buffer;
mod buffer_pool;
mod copy_engine;
mod frontend;
mod open;
mod progress;
mod section_reader;
mod units;

fn main() -> ExitCode {
    // Configure logging. Everything diagnostic goes to stderr - stdout may be
    // carrying the copied data.
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    builder.target(env_logger::Target::Stderr);
    builder.format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()));
    builder.init();

    frontend::frontend_main()
}
