use embedded_hal::delay::DelayNs;

use crate::control::{ControlLoop, Storage};
use crate::fmt::warning;

/// Runs the receiver's main loop forever.
///
/// Each pass drains the command queue into the appliance state, writes back
/// any change, then waits `poll_us` microseconds. The receive interrupt keeps
/// filling the queue in the meantime.
///
/// # Arguments
/// - `control`: The control loop, owning the queue consumer and the store.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `poll_us`: Pause between passes, in microseconds.
///
/// # Example
/// ```rust,ignore
/// let control = ControlLoop::new(consumer, eeprom)?;
/// rfswitch::timing::run_control_loop(control, &mut delay, 1_000);
/// ```
///
/// # Notes
/// - This loop will never return; it is intended for single-purpose firmware.
/// - A failed write-back is logged and retried on the next pass, since the
///   state stays dirty until a write succeeds.
pub fn run_control_loop<D, E, const N: usize>(
    mut control: ControlLoop<'_, E, N>,
    delay: &mut D,
    poll_us: u32,
) -> !
where
    D: DelayNs,
    E: Storage,
{
    loop {
        let _ = service(&mut control);
        delay.delay_us(poll_us);
    }
}

/// One pass of [`run_control_loop`]: drain, apply, persist.
///
/// # Returns
/// The number of commands applied.
pub fn service<E: Storage, const N: usize>(control: &mut ControlLoop<'_, E, N>) -> usize {
    let applied = control.poll();
    if control.is_dirty() && control.persist().is_err() {
        warning!("state write-back failed, will retry");
    }
    applied
}
