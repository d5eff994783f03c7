use keygate_store::{FlagStore, FlagValue};
use tracing::warn;

pub const SETUP_SKIPPED_KEY: &str = "api_key_setup_skipped";
pub const FIRST_USE_PROMPTED_KEY: &str = "api_key_first_use_prompted";

pub fn setup_skipped(flags: &dyn FlagStore) -> bool {
    flags.get_bool(SETUP_SKIPPED_KEY).unwrap_or(false)
}

pub fn first_use_prompted(flags: &dyn FlagStore) -> bool {
    flags.get_bool(FIRST_USE_PROMPTED_KEY).unwrap_or(false)
}

pub(crate) fn mark(flags: &dyn FlagStore, key: &str) {
    if let Err(e) = flags.set(key, FlagValue::Bool(true)) {
        warn!("Failed to set flag {}: {}", key, e);
    }
}

/// Forget both setup flags once a key is in place.
pub(crate) fn clear_setup_flags(flags: &dyn FlagStore) {
    for key in [SETUP_SKIPPED_KEY, FIRST_USE_PROMPTED_KEY] {
        if let Err(e) = flags.delete(key) {
            warn!("Failed to clear flag {}: {}", key, e);
        }
    }
}
