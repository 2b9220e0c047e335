//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                | Connects to               |
//! |-------------|---------------------------|---------------------------|
//! | `hardware`  | SensorPort, KeypadPort,   | drivers + collaborators   |
//! |             | OutputPort                |                           |
//! | `log_sink`  | EventSink                 | `log` facade              |
//! | `sim`       | display / keypad / tone   | terminal (host runs)      |
//! | `time`      | —                         | `std::time::Instant`      |

pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
