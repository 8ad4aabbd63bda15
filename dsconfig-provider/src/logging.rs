use std::io::IsTerminal as _;

use anyhow::Result;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{format::FmtSpan, Layer as FmtLayer},
    layer::SubscriberExt as _,
    Layer as _, Registry,
};

/// Install the global subscriber. Everything goes to stderr, as stdout
/// belongs to the host protocol.
pub(crate) fn set_up(verbose: bool) -> Result<()> {
    let filter = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };

    let span_events = if verbose {
        FmtSpan::FULL
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = FmtLayer::new()
        .with_writer(std::io::stderr)
        .with_span_events(span_events)
        .with_ansi(std::io::stderr().is_terminal())
        .with_filter(filter);
    let subscriber = Registry::default().with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set up tracing: {}", e))?;

    Ok(())
}
