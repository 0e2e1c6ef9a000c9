use tracing::{error, info, info_span, warn};

fn import_orders(path: &str) {
    let span = info_span!("import_orders");
    let _guard = span.enter();

    info!(path, "reading orders");
    warn!(skipped = 3_u64, "rows without sku");
    error!(path, "truncated file");
}

fn main() {
    if let Err(e) = tracing_json_log::init::install_default(Some("importer")) {
        eprintln!("tracing subscriber already installed: {}", e);
        return;
    }

    import_orders("orders.csv");
}
