const CRATES: [&str; 2] = ["trendline", "trendline_data"];

pub fn setup(is_debug: bool) -> Result<(), fern::InitError> {
    let level = if is_debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(log::LevelFilter::Warn);

    for name in CRATES {
        dispatch = dispatch.level_for(name, level);
    }

    dispatch.chain(std::io::stdout()).apply()?;
    Ok(())
}
