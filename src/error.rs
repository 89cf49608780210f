use thiserror::Error;

/// Terminal conditions for a run. None of these are recovered from by the
/// interpreter; the driver is expected to stop cycling and report them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Fault {
    /// the program counter points at (or one byte short of) the end of memory
    #[error("program counter 0x{pc:04x} went outside of memory bounds")]
    Address { pc: u16 },

    /// the opcode kind is known but its sub-selector has no instruction
    #[error("undefined instruction 0x{opcode:04x} at 0x{pc:04x}")]
    Decode { opcode: u16, pc: u16 },

    /// the ROM doesn't fit between the program address and the end of memory
    #[error("program is {len} bytes but only {capacity} bytes are available")]
    Capacity { len: usize, capacity: usize },
}

impl Fault {
    /// process exit code a driver can use when it gives up on a fault
    pub fn code(&self) -> i32 {
        match self {
            Fault::Address { .. } => 51,
            Fault::Decode { .. } => 52,
            Fault::Capacity { .. } => 53,
        }
    }
}

pub type Result<T> = std::result::Result<T, Fault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_messages() {
        assert_eq!(
            Fault::Address { pc: 0x0fff }.to_string(),
            "program counter 0x0fff went outside of memory bounds"
        );
        assert_eq!(
            Fault::Decode {
                opcode: 0x8ff8,
                pc: 0x0204
            }
            .to_string(),
            "undefined instruction 0x8ff8 at 0x0204"
        );
        assert_eq!(
            Fault::Capacity {
                len: 4000,
                capacity: 3584
            }
            .to_string(),
            "program is 4000 bytes but only 3584 bytes are available"
        );
    }

    #[test]
    fn test_fault_codes_are_distinct() {
        let codes = [
            Fault::Address { pc: 0 }.code(),
            Fault::Decode { opcode: 0, pc: 0 }.code(),
            Fault::Capacity {
                len: 0,
                capacity: 0,
            }
            .code(),
        ];
        assert_eq!(codes, [51, 52, 53]);
    }
}
