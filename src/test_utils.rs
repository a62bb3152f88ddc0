/*
 * Test utilities and fake collaborators for thermal-sysfs
 *
 * This module provides in-memory zone drivers, cooling device drivers and a
 * recording policy host that the unit tests of every module share.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::config::SysfsConfig;
    use crate::cooling::{CoolingDevice, CoolingDeviceId};
    use crate::error::{Result, ThermalError};
    use crate::ops::{CoolingOps, DeviceMode, PolicyHost, ZoneCaps, ZoneEvent, ZoneOps};
    use crate::trips::TripKind;
    use crate::zone::{ThermalZone, ThermalZoneId, ZoneDescriptor};
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    #[derive(Debug)]
    struct FakeZoneState {
        sensor: i32,
        mode: DeviceMode,
        trips: Vec<(TripKind, i32, i32)>,
        emulated: Option<i32>,
    }

    /// In-memory zone driver. Clones share state, so a test can keep a
    /// handle after giving one to a zone.
    #[derive(Debug, Clone)]
    pub struct FakeZoneOps {
        caps: ZoneCaps,
        state: Arc<Mutex<FakeZoneState>>,
    }

    impl FakeZoneOps {
        /// Trips given as (kind, temperature, hysteresis). Every accessor
        /// except driver-side emulation is available.
        pub fn with_trips(trips: Vec<(TripKind, i32, i32)>) -> Self {
            Self {
                caps: ZoneCaps::trips_read_only()
                    .with_mode()
                    .with_hysteresis(true)
                    .with_writable_trips(),
                state: Arc::new(Mutex::new(FakeZoneState {
                    sensor: 25_000,
                    mode: DeviceMode::Enabled,
                    trips,
                    emulated: None,
                })),
            }
        }

        /// Critical at 85000 (hyst 2000), passive at 70000 (hyst 1000).
        pub fn two_trips() -> Self {
            Self::with_trips(vec![
                (TripKind::Critical, 85_000, 2_000),
                (TripKind::Passive, 70_000, 1_000),
            ])
        }

        pub fn critical_only() -> Self {
            Self::with_trips(vec![(TripKind::Critical, 100_000, 0)])
        }

        pub fn no_trips() -> Self {
            Self::with_trips(Vec::new())
        }

        pub fn without_hysteresis(mut self) -> Self {
            self.caps.get_trip_hyst = false;
            self.caps.set_trip_hyst = false;
            self
        }

        pub fn with_hysteresis_read_only(mut self) -> Self {
            self.caps.set_trip_hyst = false;
            self
        }

        pub fn without_trip_temperature(mut self) -> Self {
            self.caps.get_trip_temp = false;
            self.caps.set_trip_temp = false;
            self
        }

        pub fn without_mode(mut self) -> Self {
            self.caps.get_mode = false;
            self.caps.set_mode = false;
            self
        }

        pub fn with_emulation(mut self) -> Self {
            self.caps.set_emul_temp = true;
            self
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, FakeZoneState> {
            self.state.lock().unwrap()
        }

        fn trip(&self, index: usize) -> Result<(TripKind, i32, i32)> {
            let state = self.lock();
            state
                .trips
                .get(index)
                .copied()
                .ok_or_else(|| ThermalError::invalid(format!("no trip {}", index)))
        }

        pub fn trip_count(&self) -> usize {
            self.lock().trips.len()
        }

        pub fn trip_temp(&self, index: usize) -> i32 {
            self.lock().trips[index].1
        }

        pub fn trip_hyst(&self, index: usize) -> i32 {
            self.lock().trips[index].2
        }

        pub fn mode(&self) -> DeviceMode {
            self.lock().mode
        }

        pub fn emulated(&self) -> Option<i32> {
            self.lock().emulated
        }

        pub fn set_sensor_temp(&self, temp: i32) {
            self.lock().sensor = temp;
        }
    }

    impl ZoneOps for FakeZoneOps {
        fn capabilities(&self) -> ZoneCaps {
            self.caps
        }

        fn get_temp(&self) -> Result<i32> {
            Ok(self.lock().sensor)
        }

        fn get_mode(&self) -> Result<DeviceMode> {
            Ok(self.lock().mode)
        }

        fn set_mode(&self, mode: DeviceMode) -> Result<()> {
            self.lock().mode = mode;
            Ok(())
        }

        fn get_trip_type(&self, trip: usize) -> Result<TripKind> {
            Ok(self.trip(trip)?.0)
        }

        fn get_trip_temp(&self, trip: usize) -> Result<i32> {
            Ok(self.trip(trip)?.1)
        }

        fn set_trip_temp(&self, trip: usize, temp: i32) -> Result<()> {
            self.trip(trip)?;
            self.lock().trips[trip].1 = temp;
            Ok(())
        }

        fn get_trip_hyst(&self, trip: usize) -> Result<i32> {
            Ok(self.trip(trip)?.2)
        }

        fn set_trip_hyst(&self, trip: usize, hyst: i32) -> Result<()> {
            self.trip(trip)?;
            self.lock().trips[trip].2 = hyst;
            Ok(())
        }

        fn set_emul_temp(&self, temp: i32) -> Result<()> {
            self.lock().emulated = Some(temp);
            Ok(())
        }
    }

    /// Cooling driver that accepts any state; clones share the current state.
    #[derive(Debug, Clone)]
    pub struct FakeCoolingOps {
        max: u64,
        cur: Arc<AtomicU64>,
    }

    impl FakeCoolingOps {
        pub fn new(max: u64) -> Self {
            Self { max, cur: Arc::new(AtomicU64::new(0)) }
        }

        pub fn current(&self) -> u64 {
            self.cur.load(Ordering::SeqCst)
        }
    }

    impl CoolingOps for FakeCoolingOps {
        fn get_max_state(&self) -> Result<u64> {
            Ok(self.max)
        }

        fn get_cur_state(&self) -> Result<u64> {
            Ok(self.current())
        }

        fn set_cur_state(&self, state: u64) -> Result<()> {
            self.cur.store(state, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HostEvent {
        ZoneUpdate(ThermalZoneId),
        SetTrips(ThermalZoneId),
        CdevUpdate(CoolingDeviceId),
    }

    /// Policy host that only records what it was asked to do.
    #[derive(Debug)]
    pub struct RecordingHost {
        policies: Vec<String>,
        events: Mutex<Vec<HostEvent>>,
    }

    impl RecordingHost {
        /// Offers `step_wise` and `power_allocator`.
        pub fn new() -> Self {
            Self::with_policies(&["step_wise", "power_allocator"])
        }

        pub fn with_policies(policies: &[&str]) -> Self {
            Self {
                policies: policies.iter().map(|p| p.to_string()).collect(),
                events: Mutex::new(Vec::new()),
            }
        }

        pub fn events(&self) -> Vec<HostEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn take_events(&self) -> Vec<HostEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl PolicyHost for RecordingHost {
        fn zone_update(&self, zone: ThermalZoneId, _event: ZoneEvent) {
            self.events.lock().unwrap().push(HostEvent::ZoneUpdate(zone));
        }

        fn zone_set_trips(&self, zone: ThermalZoneId) {
            self.events.lock().unwrap().push(HostEvent::SetTrips(zone));
        }

        fn cdev_update(&self, cdev: &CoolingDevice) {
            self.events.lock().unwrap().push(HostEvent::CdevUpdate(cdev.id()));
        }

        fn available_policies(&self) -> Vec<String> {
            self.policies.clone()
        }
    }

    /// Creates a registered zone backed by `ops`
    pub fn create_test_zone(
        desc: ZoneDescriptor,
        ops: FakeZoneOps,
        host: Arc<RecordingHost>,
        config: &SysfsConfig,
    ) -> Arc<ThermalZone> {
        ThermalZone::register(desc, Arc::new(ops), host, config).unwrap()
    }

    /// Creates a cooling device with statistics and a fake driver
    pub fn create_test_cdev(id: u32, type_name: &str, max_state: u64) -> Arc<CoolingDevice> {
        CoolingDevice::register(
            CoolingDeviceId(id),
            type_name,
            Arc::new(FakeCoolingOps::new(max_state)),
            &SysfsConfig::default(),
        )
        .unwrap()
    }

    /// Creates a temporary file with JSON content
    pub fn create_temp_json_file<T: serde::Serialize>(data: &T) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(data).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    /// Asserts that a slice contains a specific item
    pub fn assert_contains<T: PartialEq + std::fmt::Debug>(slice: &[T], item: &T) {
        assert!(
            slice.contains(item),
            "Expected slice to contain {:?}, but it didn't. Slice: {:?}",
            item,
            slice
        );
    }
}
