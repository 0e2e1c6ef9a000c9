use tracing_json_log::{Fields, Logger};

fn charge_card(logger: &Logger, amount_cents: u64) {
    tracing_json_log::info!(logger, { "amount_cents": amount_cents, "currency": "EUR" }, "charging card");
    if amount_cents > 10_000 {
        tracing_json_log::warning!(logger, "large charge of {} cents", amount_cents);
    }
}

fn main() {
    let logger = tracing_json_log::get_logger!("billing");

    logger.info("service starting");
    charge_card(&logger, 2_500);
    charge_card(&logger, 25_000);

    // collisions with standard fields are dropped, the rest is kept
    logger.error_with(
        "payment rejected",
        Fields::new().with("level", "spoofed").with("order_id", 991),
    );

    let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "gateway timed out");
    logger.exception("payment gateway unavailable", &err);

    // same name, same handlers: no duplicated lines
    let again = tracing_json_log::get_logger(Some("billing"));
    again.info("still one line per call");
    again.flush();
}
