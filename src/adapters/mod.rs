//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter   | Implements     | Connects to                         |
//! |-----------|----------------|-------------------------------------|
//! | `gpio`    | SensorDriver   | embedded-hal input / output pins    |
//! | `memo`    | MemoRecorder   | in-memory clip (host, tests)        |
//! | `sim`     | SensorDriver   | in-memory readings (host, tests)    |
//! | `speaker` | Speaker        | log output                          |
//! | `time`    | Clock          | OS monotonic clock / manual clock   |

pub mod gpio;
pub mod memo;
pub mod sim;
pub mod speaker;
pub mod time;
