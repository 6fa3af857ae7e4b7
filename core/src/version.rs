pub const VERSION: &str = env!("VERSECLOCK_VERSION");
pub const BUILD_TIME: &str = env!("VERSECLOCK_BUILD_TIME");

/// Panel/board combination this build targets.
pub const DEVICE_ID: &str = match option_env!("VERSECLOCK_DEVICE_ID") {
    Some(id) => id,
    None => "xiao_esp32c3_7p5",
};
