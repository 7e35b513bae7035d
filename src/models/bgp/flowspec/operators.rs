use bitflags::bitflags;

/// Operand bit marking the last item of a component's value list.
pub const END_OF_LIST: u8 = 0x80;
/// Operand bit joining an item to the previous one with a logical AND.
pub const AND_BIT: u8 = 0x40;
/// Operand bits selecting the value width, `1 << ((byte & 0x30) >> 4)`.
pub const WIDTH_MASK: u8 = 0x30;

const LESS_THAN: u8 = 0x04;
const GREATER_THAN: u8 = 0x02;
const EQUALS: u8 = 0x01;

const NOT: u8 = 0x02;
const MATCH: u8 = 0x01;

/// Value width in octets selected by an operand byte: 1, 2, 4 or 8.
#[inline]
pub const fn value_width(operand: u8) -> usize {
    1 << ((operand & WIDTH_MASK) >> 4)
}

/// Smallest of 1, 2, 4 or 8 octets that holds `value`.
#[inline]
pub const fn minimal_width(value: u64) -> usize {
    if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else if value <= 0xFFFF_FFFF {
        4
    } else {
        8
    }
}

#[inline]
const fn width_bits(width: usize) -> u8 {
    ((width.trailing_zeros() as u8) << 4) & WIDTH_MASK
}

/// Numeric operand (RFC 8955 Section 4.2.1.1)
///
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | e | a |  len  | 0 |lt |gt |eq |
/// +---+---+---+---+---+---+---+---+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericOperand {
    pub end_of_list: bool,
    pub and_bit: bool,
    pub less_than: bool,
    pub greater_than: bool,
    pub equals: bool,
}

impl NumericOperand {
    /// Decode the flag bits of an operand byte. The width selector is read separately with
    /// [value_width].
    pub const fn from_byte(byte: u8) -> Self {
        NumericOperand {
            end_of_list: byte & END_OF_LIST != 0,
            and_bit: byte & AND_BIT != 0,
            less_than: byte & LESS_THAN != 0,
            greater_than: byte & GREATER_THAN != 0,
            equals: byte & EQUALS != 0,
        }
    }

    pub const fn to_byte(&self, width: usize) -> u8 {
        let mut byte = width_bits(width);
        if self.end_of_list {
            byte |= END_OF_LIST;
        }
        if self.and_bit {
            byte |= AND_BIT;
        }
        if self.less_than {
            byte |= LESS_THAN;
        }
        if self.greater_than {
            byte |= GREATER_THAN;
        }
        if self.equals {
            byte |= EQUALS;
        }
        byte
    }
}

/// Bitmask operand (RFC 8955 Section 4.2.1.2)
///
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | e | a |  len  | 0 | 0 |not| m |
/// +---+---+---+---+---+---+---+---+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitmaskOperand {
    pub end_of_list: bool,
    pub and_bit: bool,
    /// Partial match when set, exact match otherwise.
    pub matches: bool,
    pub not: bool,
}

impl BitmaskOperand {
    pub const fn from_byte(byte: u8) -> Self {
        BitmaskOperand {
            end_of_list: byte & END_OF_LIST != 0,
            and_bit: byte & AND_BIT != 0,
            matches: byte & MATCH != 0,
            not: byte & NOT != 0,
        }
    }

    pub const fn to_byte(&self, width: usize) -> u8 {
        let mut byte = width_bits(width);
        if self.end_of_list {
            byte |= END_OF_LIST;
        }
        if self.and_bit {
            byte |= AND_BIT;
        }
        if self.not {
            byte |= NOT;
        }
        if self.matches {
            byte |= MATCH;
        }
        byte
    }
}

/// Access to the end-of-list flag shared by all operand list items.
pub trait OperandItem {
    fn end_of_list(&self) -> bool;
    fn set_end_of_list(&mut self, end_of_list: bool);
}

/// Clear the end-of-list flag on every item and set it on the last one.
pub fn terminate_list<T: OperandItem>(mut items: Vec<T>) -> Vec<T> {
    let count = items.len();
    for (i, item) in items.iter_mut().enumerate() {
        item.set_end_of_list(i + 1 == count);
    }
    items
}

/// One `(operand, value)` pair of a numeric component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericItem {
    pub operand: NumericOperand,
    pub value: u64,
}

impl NumericItem {
    pub const fn new(operand: NumericOperand, value: u64) -> Self {
        NumericItem { operand, value }
    }

    const fn with_flags(less_than: bool, greater_than: bool, equals: bool, value: u64) -> Self {
        NumericItem {
            operand: NumericOperand {
                end_of_list: false,
                and_bit: false,
                less_than,
                greater_than,
                equals,
            },
            value,
        }
    }

    pub const fn equal_to(value: u64) -> Self {
        Self::with_flags(false, false, true, value)
    }

    pub const fn less_than(value: u64) -> Self {
        Self::with_flags(true, false, false, value)
    }

    pub const fn less_than_or_equal(value: u64) -> Self {
        Self::with_flags(true, false, true, value)
    }

    pub const fn greater_than(value: u64) -> Self {
        Self::with_flags(false, true, false, value)
    }

    pub const fn greater_than_or_equal(value: u64) -> Self {
        Self::with_flags(false, true, true, value)
    }

    /// AND this item with the previous one instead of OR.
    pub const fn and(mut self) -> Self {
        self.operand.and_bit = true;
        self
    }
}

impl OperandItem for NumericItem {
    fn end_of_list(&self) -> bool {
        self.operand.end_of_list
    }

    fn set_end_of_list(&mut self, end_of_list: bool) {
        self.operand.end_of_list = end_of_list;
    }
}

/// One `(operand, bitmask)` pair of a bitmask component such as TCP flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitmaskItem {
    pub operand: BitmaskOperand,
    pub value: u64,
}

impl BitmaskItem {
    pub const fn new(operand: BitmaskOperand, value: u64) -> Self {
        BitmaskItem { operand, value }
    }

    /// Data bits must equal `value` exactly.
    pub const fn exact_match(value: u64) -> Self {
        BitmaskItem {
            operand: BitmaskOperand {
                end_of_list: false,
                and_bit: false,
                matches: false,
                not: false,
            },
            value,
        }
    }

    /// All bits of `value` must be set in the data.
    pub const fn partial_match(value: u64) -> Self {
        let mut item = Self::exact_match(value);
        item.operand.matches = true;
        item
    }

    pub const fn negate(mut self) -> Self {
        self.operand.not = true;
        self
    }

    pub const fn and(mut self) -> Self {
        self.operand.and_bit = true;
        self
    }
}

impl OperandItem for BitmaskItem {
    fn end_of_list(&self) -> bool {
        self.operand.end_of_list
    }

    fn set_end_of_list(&mut self, end_of_list: bool) {
        self.operand.end_of_list = end_of_list;
    }
}

bitflags! {
    /// Fragment bitmask (RFC 8955 Section 4.2.2.12).
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FragmentFlags: u8 {
        const DONT_FRAGMENT = 0x01;
        const IS_FRAGMENT = 0x02;
        const FIRST_FRAGMENT = 0x04;
        const LAST_FRAGMENT = 0x08;
    }
}

/// One `(operand, flags)` pair of a fragment component. Always encoded with a 1-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FragmentItem {
    pub operand: BitmaskOperand,
    pub flags: FragmentFlags,
}

impl FragmentItem {
    pub const fn new(operand: BitmaskOperand, flags: FragmentFlags) -> Self {
        FragmentItem { operand, flags }
    }

    pub const fn partial_match(flags: FragmentFlags) -> Self {
        FragmentItem {
            operand: BitmaskOperand {
                end_of_list: false,
                and_bit: false,
                matches: true,
                not: false,
            },
            flags,
        }
    }
}

impl OperandItem for FragmentItem {
    fn end_of_list(&self) -> bool {
        self.operand.end_of_list
    }

    fn set_end_of_list(&mut self, end_of_list: bool) {
        self.operand.end_of_list = end_of_list;
    }
}

bitflags! {
    /// TCP control bits as matched by the TCP flags component (RFC 8955 Section 4.2.2.9).
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TcpControlFlags: u16 {
        const FIN = 0x01;
        const SYN = 0x02;
        const RST = 0x04;
        const PSH = 0x08;
        const ACK = 0x10;
        const URG = 0x20;
        const ECE = 0x40;
        const CWR = 0x80;
    }
}
