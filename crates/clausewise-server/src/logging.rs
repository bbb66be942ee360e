use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "clausewise_server=info,clausewise_nlu=info,tower_http=debug";

/// Install the global subscriber. `RUST_LOG` overrides the default filter;
/// `log_format = "json"` switches to one JSON object per line.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log_format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
