//! sgate node runtime
//!
//! Everything around the pure `sgate_core` pipeline that a deployed sensor
//! needs: the hardware seam, a software stand-in for the board, the duty
//! cycle, configuration and model files, and the energy-adaptive demo.

pub mod config;
pub mod hal;
pub mod mock_hal;
pub mod model_file;
pub mod node;
pub mod scenario;

pub use config::{ConfigError, NodeConfig};
pub use hal::{HalError, HardwareAbstraction};
pub use mock_hal::{MockHal, Transmission, VibrationPattern};
pub use model_file::ModelFile;
pub use node::{CycleReport, NodeSettings, NodeStats, SensorNode};
