use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal_nb::serial::Read;

use crate::command::Command;
use crate::decoder::DecoderStats;
use crate::queue::{CommandQueue, Consumer};
use crate::receiver::Receiver;

/// A global receiver slot shared between `main()` and the RX interrupt.
pub type GlobalReceiver<S, const N: usize> = Mutex<RefCell<Option<Receiver<'static, S, N>>>>;

/// Used to initialize the global static [`Receiver`] for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust
/// use rfswitch::timing::{GlobalReceiver, global_receiver_init};
/// # struct Usart0;
/// # impl embedded_hal_nb::serial::ErrorType for Usart0 { type Error = core::convert::Infallible; }
/// # impl embedded_hal_nb::serial::Read<u8> for Usart0 {
/// #     fn read(&mut self) -> nb::Result<u8, Self::Error> { Err(nb::Error::WouldBlock) }
/// # }
///
/// static RF_RECEIVER: GlobalReceiver<Usart0, 2> = global_receiver_init();
/// ```
pub const fn global_receiver_init<S: Read<u8>, const N: usize>() -> GlobalReceiver<S, N> {
    Mutex::new(RefCell::new(None))
}

/// Splits `queue` and installs a receiver on its producer half.
///
/// # Arguments
/// * The global static receiver slot
/// * The serial port the radio module is wired to
/// * The static command queue
///
/// # Returns
/// * The consumer half for the main loop, or `None` if `queue` was already split
///
/// # Example
/// ```rust,ignore
/// static RF_QUEUE: CommandQueue<2> = CommandQueue::new();
/// static RF_RECEIVER: GlobalReceiver<Usart0, 2> = global_receiver_init();
///
/// fn main() -> ! {
///     let consumer = global_receiver_setup(&RF_RECEIVER, usart0, &RF_QUEUE).unwrap();
///     // ...
/// }
/// ```
pub fn global_receiver_setup<S: Read<u8>, const N: usize>(
    global: &'static GlobalReceiver<S, N>,
    serial: S,
    queue: &'static CommandQueue<N>,
) -> Option<Consumer<'static, N>> {
    let (producer, consumer) = queue.split()?;
    critical_section::with(|cs| {
        let _ = global
            .borrow(cs)
            .replace(Some(Receiver::new(serial, producer)));
    });
    Some(consumer)
}

/// Services one byte-received interrupt on the global receiver.
///
/// Silently does nothing if the receiver hasn't been set up yet.
///
/// # Example
/// ```rust,ignore
/// #[avr_device::interrupt(atmega8)]
/// fn USART_RXC() {
///     let _ = global_receiver_isr(&RF_RECEIVER);
/// }
/// ```
pub fn global_receiver_isr<S: Read<u8>, const N: usize>(
    global: &'static GlobalReceiver<S, N>,
) -> Option<Command> {
    critical_section::with(|cs| {
        global
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .and_then(|rx| rx.on_interrupt())
    })
}

/// Snapshot of the global receiver's decoder counters and dropped-command count.
pub fn global_receiver_stats<S: Read<u8>, const N: usize>(
    global: &'static GlobalReceiver<S, N>,
) -> Option<(DecoderStats, u16)> {
    critical_section::with(|cs| {
        global
            .borrow(cs)
            .borrow()
            .as_ref()
            .map(|rx| (rx.stats(), rx.dropped))
    })
}
