pub mod controller;
pub mod credential;
pub mod detector;
pub mod flags;
pub mod hook;
pub mod providers;
pub mod startup;
pub mod task;
pub mod timing;

pub use controller::{Route, SetupEvent, SetupFlowController, SetupState};
pub use credential::{has_api_key, is_configured};
pub use detector::{detect_api_key, ClipboardCandidate, ClipboardKeyDetector, DetectorEvent};
pub use hook::SetupGateHook;
pub use startup::{StartupEvent, StartupGate};
pub use timing::GateTiming;
