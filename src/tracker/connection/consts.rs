pub const BAUD_RATE: u32 = 9600;
pub const DEFAULT_TIMEOUT_MILLIS: u64 = 1000;

/// Where a paired HC-05 style Bluetooth module usually shows up on Linux
pub const FALLBACK_PATH: &str = "/dev/rfcomm0";
