use crate::hex::HEX_PAIRS;

/// Length of one trace record, including the trailing newline
///
/// Records look like `PPPPPPPPPPPPPPPP AAAAAAAAAAAAAAAA M SSS`: the pc and the address as 16
/// hex digits, a mode character, and the size as 3 decimal digits
pub const RECORD_SIZE: usize = 40;
const ADDRESS_OFFSET: usize = 17;
const ADDRESS_SIZE: usize = 16;
const ADDRESS_UPPER: usize = ADDRESS_OFFSET + ADDRESS_SIZE;
const MODE: usize = ADDRESS_UPPER + 1;
const SIZE: usize = MODE + 2;

/// What kind of memory access a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Fetch,
    Load,
    Store,
}

/// One decoded trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOp {
    Access {
        addr: u64,
        size: usize,
        kind: AccessKind,
    },
    CleanInvalidate {
        addr: u64,
        size: usize,
        clean: bool,
        inval: bool,
    },
}

/// Decodes one record. Only the mode character is checked, the hex and decimal fields are
/// trusted
///
/// # Examples
///
/// ```
/// use tracecache::trace::{parse_record, AccessKind, TraceOp};
/// let record = b"0000000000010074 0000000000002000 W 008\n";
/// assert_eq!(
///     parse_record(record),
///     Ok(TraceOp::Access { addr: 0x2000, size: 8, kind: AccessKind::Store })
/// );
/// ```
pub fn parse_record(record: &[u8; RECORD_SIZE]) -> Result<TraceOp, String> {
    let addr_digits: &[u8; ADDRESS_SIZE] = record[ADDRESS_OFFSET..ADDRESS_UPPER]
        .try_into()
        .map_err(|_| "Truncated address")?;
    let addr = parse_address(addr_digits);
    let size_digits: &[u8; 3] = record[SIZE..RECORD_SIZE - 1]
        .try_into()
        .map_err(|_| "Truncated size")?;
    let size = parse_size(size_digits) as usize;
    let access = |kind| TraceOp::Access { addr, size, kind };
    let maintain = |clean, inval| TraceOp::CleanInvalidate { addr, size, clean, inval };
    match record[MODE] {
        b'I' => Ok(access(AccessKind::Fetch)),
        b'R' => Ok(access(AccessKind::Load)),
        b'W' => Ok(access(AccessKind::Store)),
        b'C' => Ok(maintain(true, false)),
        b'X' => Ok(maintain(false, true)),
        b'F' => Ok(maintain(true, true)),
        other => Err(format!("Unknown access mode '{}'", other.escape_ascii())),
    }
}

/// Parses a 64-bit value from a 16 byte hexadecimal address
///
/// Going through `u64::from_str_radix` is the bottleneck for small caches, so this looks up
/// each pair of digits in a table generated by the build script instead. Release builds don't
/// check the input, non-hex digits just read as zero. Debug builds compare every result
/// against the standard library.
///
/// # Examples
///
/// ```
/// use tracecache::trace::parse_address;
/// let address = b"000000000000000A";
/// assert_eq!(parse_address(&address), 10)
/// ```
pub fn parse_address(buf: &[u8; 16]) -> u64 {
    let mut res: u64 = 0;
    for pair in buf.chunks_exact(2) {
        res = (res << 8) | HEX_PAIRS[pair[0] as usize][pair[1] as usize] as u64;
    }
    debug_assert_eq!(
        std::str::from_utf8(buf).ok().and_then(|s| u64::from_str_radix(s, 16).ok()),
        Some(res)
    );
    res
}

/// Parses a 3 digit decimal size
///
/// # Examples
///
/// ```
/// use tracecache::trace::parse_size;
/// let size = b"064";
/// assert_eq!(parse_size(&size), 64);
/// ```
pub fn parse_size(buf: &[u8; 3]) -> u16 {
    buf.iter()
        .fold(0u16, |acc, digit| acc * 10 + digit.wrapping_sub(b'0') as u16 % 10)
}

/// The largest size a record can carry in its three decimal digits
pub const MAX_RECORD_SIZE: usize = 999;

/// Formats a record, the inverse of [`parse_record`]. Used to write traces for tests and
/// benchmarks
///
/// Sizes above [`MAX_RECORD_SIZE`] don't fit in a record and keep only their low three decimal
/// digits
pub fn format_record(pc: u64, op: &TraceOp) -> [u8; RECORD_SIZE] {
    let (addr, size, mode) = match *op {
        TraceOp::Access { addr, size, kind } => {
            let mode = match kind {
                AccessKind::Fetch => 'I',
                AccessKind::Load => 'R',
                AccessKind::Store => 'W',
            };
            (addr, size, mode)
        }
        TraceOp::CleanInvalidate { addr, size, clean, inval } => {
            let mode = match (clean, inval) {
                (true, true) => 'F',
                (true, false) => 'C',
                _ => 'X',
            };
            (addr, size, mode)
        }
    };
    debug_assert!(size <= MAX_RECORD_SIZE, "size {size} doesn't fit in a record");
    let text = format!("{pc:016X} {addr:016X} {mode} {:03}\n", size % (MAX_RECORD_SIZE + 1));
    let mut record = [0u8; RECORD_SIZE];
    record.copy_from_slice(text.as_bytes());
    record
}
