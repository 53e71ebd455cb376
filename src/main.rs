use std::path::PathBuf;

use drawkit::{demo, init_logging, Config, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::info!("DrawKit {} (built {})", VERSION, BUILD_DATE);

    // An explicit settings file wins over the per-user one.
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::load_from_file(&path)?,
        None => Config::load_or_default(),
    };

    let report = demo::run(config)?;
    tracing::info!(
        "Session published {} event(s), {} object(s) selected at the end",
        report.events.len(),
        report.selection.len()
    );
    for (name, bounds) in &report.bounds {
        tracing::info!(
            "{}: ({:.1}, {:.1}) {:.1} x {:.1}",
            name,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        );
    }

    Ok(())
}
