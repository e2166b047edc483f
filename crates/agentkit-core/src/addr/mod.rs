//! Network address helpers
//!
//! - [`parse_ip_with_prefix`]: `ADDR` / `ADDR/LEN` text into a [`NetAddr`]
//! - [`diff_addresses`]: delete/add deltas between two address sets
//! - [`mac_int_to_string`]: integer MAC to colon-separated hex

pub mod diff;
pub mod mac;
pub mod parse;

pub use diff::{AddressDiff, diff_addresses};
pub use mac::mac_int_to_string;
pub use parse::{IpVersion, NetAddr, parse_addresses, parse_ip_with_prefix};
