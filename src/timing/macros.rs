/// Declares the static `RF_QUEUE` and `RF_RECEIVER` singletons.
///
/// `RF_RECEIVER` is guarded by a `critical_section` mutex so both `main()`
/// and the byte-received interrupt can reach it; `RF_QUEUE` is the lock-free
/// command queue between them.
///
/// # Arguments
/// - `$serial`: The concrete type of the receiving serial port (must implement
///   `embedded_hal_nb::serial::Read<u8>`)
/// - `$slots`: Optional queue length, a power of two (defaults to
///   [`RX_QUEUE_LEN`](crate::consts::RX_QUEUE_LEN))
///
/// # Example
/// ```rust,ignore
/// init_rf_receiver!(Usart0);
/// init_rf_receiver!(Usart0, 8);
/// ```
#[macro_export]
macro_rules! init_rf_receiver {
    ( $serial:ty, $slots:expr ) => {
        pub static RF_QUEUE: $crate::queue::CommandQueue<{ $slots }> =
            $crate::queue::CommandQueue::new();
        pub static RF_RECEIVER: $crate::timing::GlobalReceiver<$serial, { $slots }> =
            $crate::timing::global_receiver_init();
    };
    ( $serial:ty ) => {
        $crate::init_rf_receiver!($serial, $crate::consts::RX_QUEUE_LEN);
    };
}

/// Installs the receiver declared by `init_rf_receiver!` and hands back the
/// queue's consumer half.
///
/// Evaluates to `Option<Consumer<'static, N>>`, `None` if it was already set up.
///
/// # Arguments
/// - `$serial`: The receiving serial port
///
/// # Example
/// ```rust,ignore
/// let consumer = setup_rf_receiver!(usart0).unwrap();
/// ```
///
/// # Notes
/// - Requires `init_rf_receiver!` to have been used earlier.
#[macro_export]
macro_rules! setup_rf_receiver {
    ( $serial:expr ) => {
        $crate::timing::global_receiver_setup(&RF_RECEIVER, $serial, &RF_QUEUE)
    };
}

/// Services one byte-received interrupt on `RF_RECEIVER`.
///
/// Evaluates to the command queued by this byte, if any.
///
/// # Example
/// ```rust,ignore
/// #[avr_device::interrupt(atmega8)]
/// fn USART_RXC() {
///     let _ = rf_receiver_isr!();
/// }
/// ```
///
/// # Notes
/// - Safe to call before `setup_rf_receiver!`: it silently does nothing.
#[macro_export]
macro_rules! rf_receiver_isr {
    () => {
        $crate::timing::global_receiver_isr(&RF_RECEIVER)
    };
}
