//! Human-readable rendering of flow specification components.
//!
//! The rendered sentence is stable and used as a per-route key, so every piece ends with a
//! single trailing space and pieces are concatenated without separators.

use super::*;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Render components as `"all packets <component>..."`.
///
/// ```
/// use bgpkit_flowspec::models::*;
///
/// let components = vec![
///     FlowSpecComponent::Port(terminate_list(vec![NumericItem::greater_than(80)])),
///     FlowSpecComponent::TcpFlags(terminate_list(vec![BitmaskItem::partial_match(0x02)])),
/// ];
/// assert_eq!(
///     render_flowspec(&components),
///     "all packets where port is greater than 80 where TCP flags does match SYN "
/// );
/// ```
pub fn render_flowspec(components: &[FlowSpecComponent]) -> String {
    let mut buffer = String::from("all packets ");
    for component in components {
        buffer.push_str(component.to_string().as_str());
    }
    buffer.replace("  ", " ")
}

struct NumericWords<'a>(&'a NumericOperand, bool);

impl Display for NumericWords<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let NumericWords(op, is_first) = self;
        connector(f, op.and_bit, *is_first)?;
        match (op.less_than, op.greater_than, op.equals) {
            (true, _, true) => write!(f, "is less than or equal to "),
            (false, true, true) => write!(f, "is greater than or equal to "),
            _ => {
                if op.equals {
                    write!(f, "equals to ")?;
                }
                if op.less_than {
                    write!(f, "is less than ")?;
                }
                if op.greater_than {
                    write!(f, "is greater than ")?;
                }
                Ok(())
            }
        }
    }
}

struct BitmaskWords<'a>(&'a BitmaskOperand, bool);

impl Display for BitmaskWords<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let BitmaskWords(op, is_first) = self;
        connector(f, op.and_bit, *is_first)?;
        match (op.matches, op.not) {
            (true, true) => write!(f, "does not match "),
            (true, false) => write!(f, "does match "),
            (false, true) => write!(f, "is not "),
            (false, false) => Ok(()),
        }
    }
}

fn connector(f: &mut Formatter<'_>, and_bit: bool, is_first: bool) -> std::fmt::Result {
    match (is_first, and_bit) {
        (true, _) => Ok(()),
        (false, true) => write!(f, "and "),
        (false, false) => write!(f, "or "),
    }
}

struct TcpFlagsValue(u64);

impl Display for TcpFlagsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let known = TcpControlFlags::from_bits_truncate((self.0 & 0xFFFF) as u16);
        let rest = self.0 & !(known.bits() as u64);
        let mut names = known.iter_names().map(|(name, _)| name.to_string()).collect_vec();
        if rest != 0 || names.is_empty() {
            names.push(format!("{:#x}", rest));
        }
        write!(f, "{}", names.join("|"))
    }
}

struct FragmentValue(FragmentFlags);

impl Display for FragmentValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let flags = self.0;
        if flags.contains(FragmentFlags::DONT_FRAGMENT) {
            write!(f, "'DO NOT' ")?;
        }
        if flags.contains(FragmentFlags::FIRST_FRAGMENT) {
            write!(f, "'IS FIRST' ")?;
        }
        if flags.contains(FragmentFlags::LAST_FRAGMENT) {
            write!(f, "'IS LAST' ")?;
        }
        if flags.contains(FragmentFlags::IS_FRAGMENT) {
            write!(f, "'IS A' ")?;
        }
        Ok(())
    }
}

impl Display for FlowSpecComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowSpecComponent::DestinationPrefix(prefix) => write!(f, "to {} ", prefix),
            FlowSpecComponent::SourcePrefix(prefix) => write!(f, "from {} ", prefix),
            FlowSpecComponent::TcpFlags(items) => {
                write!(f, "where {} ", self.kind())?;
                for (i, item) in items.iter().enumerate() {
                    write!(
                        f,
                        "{}{} ",
                        BitmaskWords(&item.operand, i == 0),
                        TcpFlagsValue(item.value)
                    )?;
                }
                Ok(())
            }
            FlowSpecComponent::Fragment(items) => {
                write!(f, "where {} ", self.kind())?;
                for (i, item) in items.iter().enumerate() {
                    write!(
                        f,
                        "{}{}",
                        BitmaskWords(&item.operand, i == 0),
                        FragmentValue(item.flags)
                    )?;
                }
                Ok(())
            }
            FlowSpecComponent::Unknown {
                component_type,
                data,
            } => write!(
                f,
                "where {} {} {} ",
                self.kind(),
                component_type,
                hex::encode(data)
            ),
            numeric => {
                write!(f, "where {} ", numeric.kind())?;
                for (i, item) in numeric.numeric_items().unwrap_or_default().iter().enumerate() {
                    write!(f, "{}{} ", NumericWords(&item.operand, i == 0), item.value)?;
                }
                Ok(())
            }
        }
    }
}
