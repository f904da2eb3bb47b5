//! Layered configuration.
//!
//! YAML files are deep-merged field by field:
//! 1. **Defaults** - embedded
//! 2. **Project** - `$CWD/crew-dispatch/config.yaml`
//! 3. **User** - `~/.crew-dispatch/config.yaml`
//! 4. **Environment** - see below
//!
//! ## Environment Variables
//! - `CREW_DISPATCH_CONFIG_PATH` - Explicit config file (skips tier merging)
//! - `CREW_DISPATCH_DB_PATH` - Database path
//! - `CREW_DISPATCH_SEED_DEFAULTS` - `true`/`false`, seed an empty database
//! - `CREW_DISPATCH_DUE_SOON_HOURS` - Window for the "due soon" count
//! - `CREW_DISPATCH_USER_DIR` - User config dir (default: `~/.crew-dispatch`)
//! - `CREW_DISPATCH_PROJECT_DIR` - Project config dir (default: `./crew-dispatch`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, ENV_CONFIG_PATH};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
