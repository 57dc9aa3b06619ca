use crate::virtual_machine::Cell;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::memory::Memory;

/// How an operand's raw cell is interpreted.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// The operand is an address.
    Position = 0,
    /// The operand is the value itself. Read-only.
    Immediate = 1,
    /// The operand is an offset from the relative base.
    Relative = 2,
}

impl Mode {
    /// Parses one mode digit.
    pub fn from_digit(digit: Cell) -> Option<Self> {
        match digit {
            0 => Some(Self::Position),
            1 => Some(Self::Immediate),
            2 => Some(Self::Relative),
            _ => None,
        }
    }

    /// Resolves `raw` to the value it denotes.
    pub fn read(self, raw: Cell, relative_base: Cell, memory: &Memory) -> Result<Cell, VMError> {
        match self {
            Mode::Position => memory.read(raw),
            Mode::Immediate => Ok(raw),
            Mode::Relative => memory.read(relative_base.wrapping_add(raw)),
        }
    }

    /// Resolves `raw` to the address a result is stored at.
    ///
    /// Returns `None` for [`Mode::Immediate`], which cannot be written through.
    pub fn target(self, raw: Cell, relative_base: Cell) -> Option<Cell> {
        match self {
            Mode::Position => Some(raw),
            Mode::Immediate => None,
            Mode::Relative => Some(relative_base.wrapping_add(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Memory {
        Memory::new(vec![10, 20, 30, 40])
    }

    #[test]
    fn from_digit_valid() {
        assert_eq!(Mode::from_digit(0), Some(Mode::Position));
        assert_eq!(Mode::from_digit(1), Some(Mode::Immediate));
        assert_eq!(Mode::from_digit(2), Some(Mode::Relative));
    }

    #[test]
    fn from_digit_invalid() {
        for digit in [-1, 3, 4, 9] {
            assert_eq!(Mode::from_digit(digit), None);
        }
    }

    #[test]
    fn position_reads_memory() {
        assert_eq!(Mode::Position.read(2, 0, &memory()).unwrap(), 30);
        assert_eq!(Mode::Position.read(100, 0, &memory()).unwrap(), 0);
    }

    #[test]
    fn immediate_reads_raw_value() {
        assert_eq!(Mode::Immediate.read(-7, 5, &memory()).unwrap(), -7);
    }

    #[test]
    fn relative_reads_offset_from_base() {
        assert_eq!(Mode::Relative.read(1, 2, &memory()).unwrap(), 40);
        assert_eq!(Mode::Relative.read(-2, 3, &memory()).unwrap(), 20);
    }

    #[test]
    fn negative_effective_address_is_rejected() {
        assert!(matches!(
            Mode::Position.read(-1, 0, &memory()),
            Err(VMError::NegativeAddress { address: -1 })
        ));
        assert!(matches!(
            Mode::Relative.read(-5, 2, &memory()),
            Err(VMError::NegativeAddress { address: -3 })
        ));
    }

    #[test]
    fn write_targets() {
        assert_eq!(Mode::Position.target(7, 100), Some(7));
        assert_eq!(Mode::Relative.target(7, 100), Some(107));
        assert_eq!(Mode::Immediate.target(7, 100), None);
    }
}
