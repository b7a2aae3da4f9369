//! Session overview

use taskwarden::output::{OutputMode, StatusReport};

/// Show tasks per status, holders and pending reviews
pub fn status(mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    StatusReport::from_state(&enforcer.state()?).render(mode);
    Ok(0)
}
