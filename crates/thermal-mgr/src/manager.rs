use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};

use log::info;

use crate::QUEUE_LENGTH;
use crate::error::ThermalError;
use crate::event::ThermalEvent;
use crate::gateway::{SensorConfig, TemperatureSensor};
use crate::monitor::MonitorTask;
use crate::notify::Notifier;
use crate::queue::EventQueue;

/// The thermal manager context.
///
/// It owns the event queue and the bookkeeping shared by the producers and
/// the monitor. It is `const`-constructible, so firmware usually places it in
/// a `static` and hands out references to producers:
///
/// - [`ThermalManager::send_event`] and [`ThermalManager::send_event_code`]
///   for task-context producers, which receive every error;
/// - [`ThermalManager::on_os_interrupt`] for the sensor interrupt handler,
///   which never fails and counts the events it could not enqueue.
///
/// The only consumer, the [`MonitorTask`], is returned by
/// [`ThermalManager::init`].
pub struct ThermalManager<M = CriticalSectionRawMutex, const N: usize = QUEUE_LENGTH>
where
    M: RawMutex,
{
    queue: EventQueue<M, ThermalEvent, N>,
    initialized: Mutex<M, Cell<bool>>,
    dropped: Mutex<M, Cell<u32>>,
}

impl<const N: usize> ThermalManager<CriticalSectionRawMutex, N> {
    /// Creates an uninitialized [`ThermalManager`] guarded by a critical
    /// section.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_mutex()
    }
}

impl<const N: usize> Default for ThermalManager<CriticalSectionRawMutex, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, const N: usize> ThermalManager<M, N>
where
    M: RawMutex,
{
    /// Creates an uninitialized [`ThermalManager`] guarded by the raw
    /// mutex `M`.
    #[must_use]
    pub const fn with_mutex() -> Self {
        Self {
            queue: EventQueue::with_mutex(),
            initialized: Mutex::new(Cell::new(false)),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Initializes the thermal manager and returns its [`MonitorTask`].
    ///
    /// The task borrows `config` for its whole lifetime. From now on,
    /// events are accepted by the producers.
    ///
    /// # Errors
    ///
    /// Returns [`ThermalError::InvalidState`] if the thermal manager has
    /// already been initialized, so that the queue never has more than one
    /// consumer.
    pub fn init<'a, C, S, T>(
        &'a self,
        config: &'a C,
        sensor: S,
        notifier: T,
    ) -> Result<MonitorTask<'a, C, S, T, M, N>, ThermalError>
    where
        C: SensorConfig,
        S: TemperatureSensor,
        T: Notifier,
    {
        if self.initialized.lock(|initialized| initialized.replace(true)) {
            return Err(ThermalError::InvalidState);
        }

        info!(
            "Thermal manager initialized for the sensor at address {:#04x}",
            config.address()
        );

        Ok(MonitorTask::new(self, config, sensor, notifier))
    }

    /// Returns whether [`ThermalManager::init`] has been called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.lock(Cell::get)
    }

    /// Submits an event to the monitor without blocking.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`ThermalError::InvalidState`] if the thermal manager has not been
    ///   initialized.
    /// - [`ThermalError::QueueFull`] if the event queue is full.
    pub fn send_event(&self, event: ThermalEvent) -> Result<(), ThermalError> {
        if !self.is_initialized() {
            return Err(ThermalError::InvalidState);
        }

        self.queue.send(event)?;

        Ok(())
    }

    /// Submits an event, identified by its raw code, to the monitor without
    /// blocking.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`ThermalError::InvalidArgument`] if the code does not identify any
    ///   [`ThermalEvent`].
    /// - The errors of [`ThermalManager::send_event`].
    pub fn send_event_code(&self, code: u8) -> Result<(), ThermalError> {
        self.send_event(ThermalEvent::try_from(code)?)
    }

    /// Submits a [`ThermalEvent::OsInterrupt`] event.
    ///
    /// Meant to be called from the interrupt handler of the sensor OS
    /// output: it never blocks and never logs. An event that cannot be
    /// enqueued is dropped and counted in
    /// [`ThermalManager::dropped_events`].
    pub fn on_os_interrupt(&self) {
        if self.send_event(ThermalEvent::OsInterrupt).is_err() {
            self.dropped
                .lock(|dropped| dropped.set(dropped.get().saturating_add(1)));
        }
    }

    /// Returns the number of interrupt events dropped so far.
    #[must_use]
    pub fn dropped_events(&self) -> u32 {
        self.dropped.lock(Cell::get)
    }

    /// Returns the number of events waiting for the monitor.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub(crate) const fn queue(&self) -> &EventQueue<M, ThermalEvent, N> {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::ThermalManager;

    use crate::QUEUE_LENGTH;
    use crate::error::ThermalError;
    use crate::event::ThermalEvent;
    use crate::notify::LogNotifier;
    use crate::tests::FakeSensor;

    const ADDRESS: u8 = 0x4F;

    #[test]
    fn send_before_init() {
        let manager = ThermalManager::<_, QUEUE_LENGTH>::new();

        assert!(!manager.is_initialized());
        assert_eq!(
            manager.send_event(ThermalEvent::MeasureTemperature),
            Err(ThermalError::InvalidState)
        );
        assert_eq!(manager.send_event_code(0), Err(ThermalError::InvalidState));
        assert_eq!(manager.pending_events(), 0);
    }

    #[test]
    fn unknown_event_code() {
        let manager = ThermalManager::<_, QUEUE_LENGTH>::new();

        // Argument validation comes before the state check.
        assert_eq!(
            manager.send_event_code(42),
            Err(ThermalError::InvalidArgument)
        );

        let _task = manager
            .init(&ADDRESS, FakeSensor::new([]), LogNotifier::new())
            .unwrap();
        assert_eq!(
            manager.send_event_code(42),
            Err(ThermalError::InvalidArgument)
        );
        assert_eq!(manager.pending_events(), 0);

        manager.send_event_code(1).unwrap();
        assert_eq!(manager.pending_events(), 1);
    }

    #[test]
    fn init_only_once() {
        let manager = ThermalManager::<_, QUEUE_LENGTH>::new();

        let _task = manager
            .init(&ADDRESS, FakeSensor::new([]), LogNotifier::new())
            .unwrap();
        assert!(manager.is_initialized());

        let second = manager.init(&ADDRESS, FakeSensor::new([]), LogNotifier::new());
        assert!(matches!(second, Err(ThermalError::InvalidState)));
    }

    #[test]
    fn queue_full() {
        let manager = ThermalManager::<_, 2>::new();
        let _task = manager
            .init(&ADDRESS, FakeSensor::new([]), LogNotifier::new())
            .unwrap();

        manager.send_event(ThermalEvent::MeasureTemperature).unwrap();
        manager.send_event(ThermalEvent::OsInterrupt).unwrap();

        assert_eq!(
            manager.send_event(ThermalEvent::MeasureTemperature),
            Err(ThermalError::QueueFull)
        );
        assert_eq!(manager.pending_events(), 2);
        // Task-context failures are returned, never counted.
        assert_eq!(manager.dropped_events(), 0);
    }

    #[test]
    fn interrupts_are_counted_when_dropped() {
        let manager = ThermalManager::<_, 2>::new();

        // Not initialized yet.
        manager.on_os_interrupt();
        assert_eq!(manager.dropped_events(), 1);
        assert_eq!(manager.pending_events(), 0);

        let _task = manager
            .init(&ADDRESS, FakeSensor::new([]), LogNotifier::new())
            .unwrap();

        manager.on_os_interrupt();
        manager.on_os_interrupt();
        assert_eq!(manager.dropped_events(), 1);
        assert_eq!(manager.pending_events(), 2);

        // Queue full.
        manager.on_os_interrupt();
        assert_eq!(manager.dropped_events(), 2);
        assert_eq!(manager.pending_events(), 2);
    }

    #[test]
    fn static_manager() {
        static THERMAL: ThermalManager = ThermalManager::new();
        static CONFIG: u8 = ADDRESS;

        let _task = THERMAL
            .init(&CONFIG, FakeSensor::new([]), LogNotifier::new())
            .unwrap();

        for _ in 0..QUEUE_LENGTH {
            THERMAL.on_os_interrupt();
        }
        assert_eq!(THERMAL.pending_events(), QUEUE_LENGTH);
        assert_eq!(THERMAL.dropped_events(), 0);
    }
}
