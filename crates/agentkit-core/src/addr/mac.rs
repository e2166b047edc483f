//! MAC address formatting

/// Render the low 48 bits of `mac` as `xx:xx:xx:xx:xx:xx`
pub fn mac_int_to_string(mac: u64) -> String {
    let bytes = mac.to_be_bytes();
    bytes[2..]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
