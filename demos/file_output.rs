//! Run with `LOG_TO_FILE=true LOG_FILE_DIR=/tmp/t1 APP_NAME=svc` to get
//! `/tmp/t1/svc_<date>_<hour>.log` next to the console output.

use std::time::Instant;

fn main() {
    let logger = tracing_json_log::get_logger(None);
    let config = logger.config();
    println!(
        "logger {:?}: level={} file={} dir={}",
        logger.name(),
        config.level,
        config.log_to_file,
        config.log_dir.display()
    );

    let n: u64 = 1_000;
    let start = Instant::now();
    for i in 0..n {
        tracing_json_log::info!(logger, { "iteration": i }, "file load test");
    }
    let elapsed = start.elapsed();

    println!(
        "wrote {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
