use crate::config::settings::SETTINGS;

fn parse_level(level: &str) -> log::LevelFilter {
    match level {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

pub fn setup_logger() {
    let log_level = match &SETTINGS.logger {
        Some(logger) => parse_level(logger.level.as_str()),
        None => log::LevelFilter::Info,
    };

    env_logger::builder()
        .filter_level(log_level)
        .format_timestamp_micros()
        .format(ecs_logger::format)
        .target(env_logger::Target::Stdout)
        .init();
}


#[cfg(test)]
mod tests {
    use log::info;
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), log::LevelFilter::Trace);
        assert_eq!(parse_level("warn"), log::LevelFilter::Warn);
        assert_eq!(parse_level("verbose"), log::LevelFilter::Info);
    }

    #[test]
    fn test_logger() {
        setup_logger();
        info!("test log info");
    }
}
