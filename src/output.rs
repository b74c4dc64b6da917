//! Device listing output.

use crate::model::{Device, Endpoint};

/// Render the device listing.
///
/// One line per device, `Bus BBB Device DDD: ID vvvv:pppp manufacturer`,
/// followed by a tab-indented `Intf <sysname> (<driver>)` line per
/// interface. Missing attributes print as empty strings. Verbose output adds
/// speed, qualifier and endpoint lines.
pub fn generate_listing(devices: &[Device], verbose: bool) -> String {
    let mut output = String::new();

    for device in devices {
        output.push_str(&format!(
            "Bus {:03} Device {:03}: ID {}:{} {}\n",
            device.address.bus,
            device.address.device,
            field(&device.id_vendor),
            field(&device.id_product),
            field(&device.manufacturer)
        ));

        if verbose {
            if let Some(speed) = device.speed_kind() {
                output.push_str(&format!("\tSpeed {}\n", speed));
            }
            if let Some(dq) = &device.qualifier {
                output.push_str(&format!(
                    "\tQualifier bcdUSB {} class {} maxpacket {} configs {}\n",
                    dq.bcd_usb, dq.b_device_class, dq.b_max_packet_size0, dq.b_num_configurations
                ));
            }
            output.push_str(&format!("\t{}\n", endpoint_line(&device.ep0)));
        }

        for interface in &device.interfaces {
            output.push_str(&format!(
                "\tIntf {} ({})\n",
                interface.sysname,
                field(&interface.driver)
            ));

            if verbose {
                for endpoint in &interface.endpoints {
                    output.push_str(&format!("\t\t{}\n", endpoint_line(endpoint)));
                }
            }
        }
    }

    output
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn endpoint_line(endpoint: &Endpoint) -> String {
    let address = endpoint
        .address()
        .map(|a| format!("{:02x}", a))
        .unwrap_or_else(|| field(&endpoint.b_endpoint_address).to_string());
    let direction = endpoint
        .direction_kind()
        .map(|d| d.to_string())
        .unwrap_or_else(|| field(&endpoint.direction).to_string());
    let transfer = endpoint
        .transfer_kind()
        .map(|t| t.to_string())
        .unwrap_or_else(|| field(&endpoint.transfer_type).to_string());

    format!("Ep {} ({} {})", address, direction, transfer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DeviceQualifier;
    use crate::model::{BusAddress, Interface};

    fn endpoint(name: &str, address: &str, direction: &str, kind: &str) -> Endpoint {
        Endpoint {
            name: name.to_string(),
            b_endpoint_address: Some(address.to_string()),
            direction: Some(direction.to_string()),
            transfer_type: Some(kind.to_string()),
            ..Endpoint::default()
        }
    }

    fn keyboard() -> Device {
        Device {
            address: BusAddress::new(1, 5),
            id_vendor: Some("046d".to_string()),
            id_product: Some("c31c".to_string()),
            manufacturer: Some("Logitech".to_string()),
            speed: Some("1.5".to_string()),
            ep0: endpoint("ep_00", "00", "both", "Control"),
            interfaces: vec![
                Interface {
                    sysname: "1-1.2:1.0".to_string(),
                    driver: Some("usbhid".to_string()),
                    endpoints: vec![endpoint("ep_81", "81", "in", "Interrupt")],
                    ..Interface::default()
                },
                Interface {
                    sysname: "1-1.2:1.1".to_string(),
                    ..Interface::default()
                },
            ],
            ..Device::default()
        }
    }

    #[test]
    fn test_listing_format() {
        let listing = generate_listing(&[keyboard()], false);
        assert_eq!(
            listing,
            "Bus 001 Device 005: ID 046d:c31c Logitech\n\
             \tIntf 1-1.2:1.0 (usbhid)\n\
             \tIntf 1-1.2:1.1 ()\n"
        );
    }

    #[test]
    fn test_zero_padding_and_missing_fields() {
        let device = Device {
            address: BusAddress::new(12, 123),
            ..Device::default()
        };
        assert_eq!(
            generate_listing(&[device], false),
            "Bus 012 Device 123: ID : \n"
        );
    }

    #[test]
    fn test_verbose_listing() {
        let mut device = keyboard();
        device.qualifier = DeviceQualifier::parse(&[9, 0x06, 0x00, 0x02, 0, 0, 0, 64, 1]);

        let listing = generate_listing(&[device], true);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Bus 001 Device 005: ID 046d:c31c Logitech",
                "\tSpeed Low Speed (1.5 Mbps)",
                "\tQualifier bcdUSB 02.00 class 0 maxpacket 64 configs 1",
                "\tEp 00 (BOTH Control)",
                "\tIntf 1-1.2:1.0 (usbhid)",
                "\t\tEp 81 (IN Interrupt)",
                "\tIntf 1-1.2:1.1 ()",
            ]
        );
    }
}
