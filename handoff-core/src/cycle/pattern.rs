//! Deterministic test pattern shared by both ends of the bus
//!
//! The master sends `i mod 256`, the slave sends the bitwise complement.
//! Each side expects to receive what the other one sends.

use crate::config::Role;

/// Pattern byte at index `i`
pub const fn pattern_byte(i: usize) -> u8 {
    (i % 256) as u8
}

impl Role {
    /// Byte this side sends at index `i`
    pub const fn send_byte(self, i: usize) -> u8 {
        match self {
            Role::Master => pattern_byte(i),
            Role::Slave => !pattern_byte(i),
        }
    }

    /// Byte this side expects to receive at index `i`
    pub const fn expected_byte(self, i: usize) -> u8 {
        self.peer().send_byte(i)
    }

    /// The other end of the bus
    pub const fn peer(self) -> Role {
        match self {
            Role::Master => Role::Slave,
            Role::Slave => Role::Master,
        }
    }
}

/// Fill `buf` with what `role` sends
pub fn fill_send(buf: &mut [u8], role: Role) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = role.send_byte(i);
    }
}

/// Fill `buf` with what `role` expects to receive
pub fn fill_expected(buf: &mut [u8], role: Role) {
    fill_send(buf, role.peer());
}

/// Count bytes in `received` that differ from what `role` expects
pub fn count_mismatches(received: &[u8], role: Role) -> usize {
    received
        .iter()
        .enumerate()
        .filter(|&(i, &byte)| byte != role.expected_byte(i))
        .count()
}
