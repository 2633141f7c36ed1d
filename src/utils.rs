mod log;

pub use self::log::Logger;
