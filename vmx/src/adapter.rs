const ETHERNET: &str = "ethernet";
const GENERATED_ADDRESS: &str = "generatedAddress";
const ADDRESS: &str = "address";

/// Splits `ethernetN.rest` into (`ethernetN`, `rest`).
fn split_ethernet_key(key: &str) -> Option<(&str, &str)> {
    let (device, rest) = key.split_once('.')?;
    let index = device.strip_prefix(ETHERNET)?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((device, rest))
}

/// The adapter id for keys naming a MAC address
/// (`ethernetN.generatedAddress` or `ethernetN.address`).
pub fn adapter_id(key: &str) -> Option<&str> {
    match split_ethernet_key(key)? {
        (device, GENERATED_ADDRESS) | (device, ADDRESS) => Some(device),
        _ => None,
    }
}

/// Any `ethernetN.generatedAddress*` key, including offsets and flags.
pub fn is_generated_address_key(key: &str) -> bool {
    split_ethernet_key(key).is_some_and(|(_, rest)| rest.starts_with(GENERATED_ADDRESS))
}
