use perfalg_observe::{LoggerConfig, LoggerError, LoggerFormat, logger_init};

#[test]
fn second_init_is_rejected() {
    logger_init(&LoggerConfig::new(LoggerFormat::Text, "debug")).unwrap();
    tracing::info!(round = 0, "logger ready");

    assert!(matches!(
        logger_init(&LoggerConfig::new(LoggerFormat::Json, "info")),
        Err(LoggerError::AlreadyInitialized)
    ));
}
