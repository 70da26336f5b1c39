use anyhow::{anyhow, Result};
use csw_core::ElementClass;

use crate::session::EngineSession;

/// Set every load to its nominal power times `load_level`.
///
/// Scaling always starts from the session's nominal values, not from the
/// previously applied level, so repeated application across a sweep does not
/// compound.
pub fn apply_load_level<S: EngineSession + ?Sized>(session: &mut S, load_level: f64) -> Result<()> {
    if load_level < 0.0 {
        return Err(anyhow!("load level must be non-negative, got {load_level}"));
    }
    for load in session.resolve_elements(ElementClass::Load)? {
        let (nominal_p, nominal_q) = session.load_nominal_power(load)?;
        session.set_load_power(load, nominal_p * load_level, nominal_q * load_level)?;
    }
    Ok(())
}
