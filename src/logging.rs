use std::io;
use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_STDOUT_FILTER: &str = "info,web_request=warn,llm_request=info,engine=info";
const DEFAULT_FILE_FILTER: &str = "info,llm_request=debug,model=debug,engine=debug";

pub fn configure_logging(log_dir: &str) {
    // html5ever is pulled in by feed parsing and is noisy on malformed summaries
    let custom_filter = FilterFn::new(|metadata| {
        !(metadata.level() == &Level::WARN && metadata.target().starts_with("html5ever"))
    });

    // RUST_LOG wins over the built-in stdout filter when set
    let stdout_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDOUT_FILTER));

    let stdout_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(stdout_filter)
        .with_filter(custom_filter);

    let file_appender = rolling::daily(log_dir, "newslens.log");
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(DEFAULT_FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
