use alloc::string::String;
use log::{Metadata, Record};

use core::fmt::Write;

use rtt_target::rprintln;

#[macro_export]
macro_rules! error_with_location {
    ($msg:expr) => {
        anyhow::anyhow!("{} at {}:{}", $msg, file!(), line!())
    };
    ($fmt:expr, $($arg:tt)*) => {
        anyhow::anyhow!("{} at {}:{}", alloc::format!($fmt, $($arg)*), file!(), line!())
    };
}

/// Sends every record to RTT and to the UART console.
pub struct MultiLogger;

impl log::Log for MultiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // format once
        let mut buf = String::new();
        let _ = write!(
            &mut buf,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );

        // RTT
        rprintln!("{}", buf);

        // UART, straight through esp_println so this can't recurse into the logger
        esp_println::println!("{}", buf);
    }

    fn flush(&self) {}
}
