use std::collections::BTreeMap;

use crate::models::{Credentials, DeviceRecord, DEFAULT_DEVICE_TYPE};

pub const HOSTNAME_R51: &str = "C8K-R51";
pub const HOSTNAME_R52: &str = "C8K-R52";
pub const IP_R51: &str = "10.0.0.51";
pub const IP_R52: &str = "10.0.0.52";
pub const COMMAND_1: &str = "show ip interface brief";
pub const COMMAND_2: &str = "show ip route";
pub const EIGRP_AS: u32 = 100;

/// The two lab routers keyed by name, carrying the supplied credentials
pub fn devices_by_name(creds: &Credentials) -> BTreeMap<String, DeviceRecord> {
    let mut devices = BTreeMap::new();
    devices.insert(
        "device1".to_string(),
        DeviceRecord::new(HOSTNAME_R51, IP_R51, DEFAULT_DEVICE_TYPE).with_credentials(creds),
    );
    devices.insert(
        "device2".to_string(),
        DeviceRecord::new(HOSTNAME_R52, IP_R52, DEFAULT_DEVICE_TYPE).with_credentials(creds),
    );
    devices
}

/// The same two routers as an ordered list
pub fn device_list(creds: &Credentials) -> Vec<DeviceRecord> {
    vec![
        DeviceRecord::new(HOSTNAME_R51, IP_R51, DEFAULT_DEVICE_TYPE).with_credentials(creds),
        DeviceRecord::new(HOSTNAME_R52, IP_R52, DEFAULT_DEVICE_TYPE).with_credentials(creds),
    ]
}

fn type_of<T>(_: &T) -> &'static str {
    std::any::type_name::<T>()
}

/// Lines printed by lab 1
pub fn report(creds: &Credentials) -> Vec<String> {
    let device_ips = [IP_R51, IP_R52];
    let by_name = devices_by_name(creds);
    let list = device_list(creds);
    let device1 = &by_name["device1"];

    vec![
        format!("The hostname of the router is {}", HOSTNAME_R51),
        format!("The hostname of the router is {}", HOSTNAME_R52),
        format!("The hostname of the router is {} and the IP is {}", HOSTNAME_R51, IP_R51),
        format!("The hostname of the router is {} and the IP is {}", HOSTNAME_R52, IP_R52),
        format!("{} , {}", COMMAND_1, COMMAND_2),
        format!("{}, {}", COMMAND_1, COMMAND_2),
        format!("AS is: {} and type is: {}", EIGRP_AS, type_of(&EIGRP_AS)),
        format!("The IP address of {} is {}", HOSTNAME_R51, device_ips[0]),
        format!("The IP address of {} is {}", device1.hostname, device1.ip),
        format!("The IP address of {} is {}", list[1].hostname, list[1].ip),
    ]
}
