//! Deterministic device ordering.

use crate::model::Device;

/// Sort devices ascending by numeric (busnum, devnum).
///
/// Insertion sort into a fresh list: each device, taken in input order, goes
/// in front of the first placed device with a strictly greater key, so
/// devices sharing a key keep their input order. Quadratic, which is fine for
/// the tens of devices a system has.
pub fn sort_devices(devices: Vec<Device>) -> Vec<Device> {
    let mut sorted: Vec<Device> = Vec::with_capacity(devices.len());

    for device in devices {
        let key = device.sort_key();
        match sorted.iter().position(|placed| placed.sort_key() > key) {
            Some(index) => sorted.insert(index, device),
            None => sorted.push(device),
        }
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BusAddress;

    fn device(bus: &str, dev: &str, serial: &str) -> Device {
        Device {
            address: BusAddress::parse(Some(bus), Some(dev)),
            busnum: Some(bus.to_string()),
            devnum: Some(dev.to_string()),
            serial: Some(serial.to_string()),
            ..Device::default()
        }
    }

    fn keys(devices: &[Device]) -> Vec<(u32, u32)> {
        devices
            .iter()
            .map(|d| (d.address.bus, d.address.device))
            .collect()
    }

    fn serials(devices: &[Device]) -> Vec<&str> {
        devices
            .iter()
            .map(|d| d.serial.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let sorted = sort_devices(vec![device("2", "10", "a"), device("2", "5", "b")]);
        assert_eq!(keys(&sorted), vec![(2, 5), (2, 10)]);
    }

    #[test]
    fn test_bus_before_device() {
        let sorted = sort_devices(vec![
            device("3", "1", "a"),
            device("1", "7", "b"),
            device("2", "2", "c"),
            device("1", "2", "d"),
        ]);
        assert_eq!(keys(&sorted), vec![(1, 2), (1, 7), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let sorted = sort_devices(vec![
            device("1", "4", "first"),
            device("1", "2", "x"),
            device("1", "4", "second"),
            device("1", "4", "third"),
            device("1", "1", "y"),
        ]);
        assert_eq!(keys(&sorted), vec![(1, 1), (1, 2), (1, 4), (1, 4), (1, 4)]);
        assert_eq!(serials(&sorted), vec!["y", "x", "first", "second", "third"]);
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            device("2", "3", "a"),
            device("1", "9", "b"),
            device("2", "3", "c"),
            device("1", "10", "d"),
            device("1", "1", "e"),
        ];
        let once = sort_devices(input);
        let twice = sort_devices(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_decreasing_for_many_inputs() {
        // Deterministic pseudo-random keys with plenty of duplicates
        let mut state = 7u32;
        let input: Vec<Device> = (0..40)
            .map(|i| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let bus = (state >> 16) % 3;
                let dev = (state >> 8) % 5;
                device(&bus.to_string(), &dev.to_string(), &i.to_string())
            })
            .collect();
        let expected_len = input.len();

        let sorted = sort_devices(input);
        assert_eq!(sorted.len(), expected_len);
        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.sort_key() <= b.sort_key());
            if a.sort_key() == b.sort_key() {
                let ia: u32 = a.serial.as_deref().unwrap().parse().unwrap();
                let ib: u32 = b.serial.as_deref().unwrap().parse().unwrap();
                assert!(ia < ib, "equal keys reordered");
            }
        }
    }

    #[test]
    fn test_empty() {
        assert!(sort_devices(Vec::new()).is_empty());
    }
}
