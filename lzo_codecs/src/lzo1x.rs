//! LZO1X-1 block transform.
//!
//! The compressor follows the reference LZO1X-1 match finder: a 14-bit hash
//! of the next four bytes indexes a dictionary of recent positions, input is
//! processed in windows of at most 49152 bytes so positions fit in `u16`,
//! and literal runs skip ahead faster the longer they get. The decompressor
//! is the bounds-checked variant: every read, write and back-reference is
//! checked and reported as a status instead of running past a buffer.
//!
//! # Stream layout
//! ```text
//! [first literal run: 17 + n, n <= 238]?       (only at stream start)
//! ( [literal run] [match] )*                   (1..3 literals ride in the
//!                                               low bits of the previous match)
//! [16 + 1, 0, 0]                               end-of-stream marker
//! ```

const M2_MAX_LEN: usize = 8;
const M3_MAX_LEN: usize = 33;
const M4_MAX_LEN: usize = 9;
const M2_MAX_OFFSET: usize = 0x0800;
const M3_MAX_OFFSET: usize = 0x4000;
const M3_MARKER: u8 = 32;
const M4_MARKER: u8 = 16;

const D_BITS: u32 = 14;
const D_SIZE: usize = 1 << D_BITS;
const D_MASK: usize = D_SIZE - 1;
const WINDOW: usize = 49152;

/// Bytes of work memory [`compress`] needs: one `u16` per dictionary slot.
pub const LZO1X_1_MEM_COMPRESS: usize = D_SIZE * 2;

/// Bytes at the end of each window that are never searched for matches.
const TAIL: usize = 20;

const EOF_MARKER: [u8; 3] = [M4_MARKER | 1, 0, 0];

/// Worst-case compressed size for `len` bytes of input.
pub const fn compress_bound(len: usize) -> usize {
    len + len / 16 + 64 + 3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    OutputTooSmall,
    ScratchTooSmall,
    /// A literal count had to be folded into a match that was never written.
    Internal,
}

/// How [`decompress`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    InputNotConsumed,
    InputOverrun,
    OutputOverrun,
    LookbehindOverrun,
}

/// `status` plus how far the decoder got in each buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub status: Status,
    pub consumed: usize,
    pub produced: usize,
}

// ── Compression ─────────────────────────────────────────────────────────────

/// Bounded output cursor. Nothing is ever written past `buf.len()`.
struct Sink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Sink<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn put(&mut self, byte: u8) -> Result<(), CompressError> {
        let slot = self.buf.get_mut(self.pos).ok_or(CompressError::OutputTooSmall)?;
        *slot = byte;
        self.pos += 1;
        Ok(())
    }

    #[inline]
    fn extend(&mut self, bytes: &[u8]) -> Result<(), CompressError> {
        let end = self.pos + bytes.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(CompressError::OutputTooSmall)?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// OR a short literal count into the low bits of the byte `back`
    /// positions behind the cursor.
    #[inline]
    fn fold_into_previous(&mut self, back: usize, bits: u8) -> Result<(), CompressError> {
        let at = self.pos.checked_sub(back).ok_or(CompressError::Internal)?;
        self.buf[at] |= bits;
        Ok(())
    }

    /// Length continuation: zero bytes for each 255, then the remainder.
    fn put_count(&mut self, mut count: usize) -> Result<(), CompressError> {
        while count > 255 {
            count -= 255;
            self.put(0)?;
        }
        self.put(count as u8)
    }
}

struct Dict<'a>(&'a mut [u8]);

impl Dict<'_> {
    #[inline]
    fn get(&self, slot: usize) -> usize {
        u16::from_ne_bytes([self.0[2 * slot], self.0[2 * slot + 1]]) as usize
    }

    #[inline]
    fn set(&mut self, slot: usize, pos: usize) {
        let bytes = (pos as u16).to_ne_bytes();
        self.0[2 * slot] = bytes[0];
        self.0[2 * slot + 1] = bytes[1];
    }

    fn clear(&mut self) {
        self.0.fill(0);
    }
}

#[inline]
fn read_le32(src: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([src[at], src[at + 1], src[at + 2], src[at + 3]])
}

#[inline]
fn dindex(dv: u32) -> usize {
    (0x1824_429d_u32.wrapping_mul(dv) >> (32 - D_BITS)) as usize & D_MASK
}

/// Compress `src` into `dst` with LZO1X-1, returning the bytes written.
///
/// `wrkmem` must hold at least [`LZO1X_1_MEM_COMPRESS`] bytes; its
/// contents on entry do not matter. `dst` is never written past its end:
/// when it runs out the call returns [`CompressError::OutputTooSmall`].
pub fn compress(src: &[u8], dst: &mut [u8], wrkmem: &mut [u8]) -> Result<usize, CompressError> {
    let wrkmem = wrkmem
        .get_mut(..LZO1X_1_MEM_COMPRESS)
        .ok_or(CompressError::ScratchTooSmall)?;
    let mut dict = Dict(wrkmem);
    let mut out = Sink::new(dst);

    let mut ip = 0;
    let mut remaining = src.len();
    let mut pending = 0;

    while remaining > TAIL {
        let len = remaining.min(WINDOW);
        dict.clear();
        pending = compress_window(src, ip, len, &mut out, pending, &mut dict)?;
        ip += len;
        remaining -= len;
    }
    pending += remaining;

    if pending > 0 {
        let start = src.len() - pending;
        if out.pos == 0 && pending <= 238 {
            out.put((17 + pending) as u8)?;
        } else {
            put_literal_header(&mut out, pending)?;
        }
        out.extend(&src[start..])?;
    }

    out.extend(&EOF_MARKER)?;
    Ok(out.pos)
}

fn put_literal_header(out: &mut Sink<'_>, count: usize) -> Result<(), CompressError> {
    if count <= 3 {
        out.fold_into_previous(2, count as u8)
    } else if count <= 18 {
        out.put((count - 3) as u8)
    } else {
        out.put(0)?;
        out.put_count(count - 18)
    }
}

/// Compress one window `src[base..base + len]`. `carried` literals that
/// precede `base` are still unwritten. Returns the literals left unwritten
/// at the end of the window, including any still carried.
fn compress_window(
    src: &[u8],
    base: usize,
    len: usize,
    out: &mut Sink<'_>,
    carried: usize,
    dict: &mut Dict<'_>,
) -> Result<usize, CompressError> {
    let in_end = base + len;
    let ip_end = in_end - TAIL;
    let mut carried = carried;
    let mut ii = base;
    let mut ip = base + 4usize.saturating_sub(carried);
    let mut after_match = false;

    loop {
        if !after_match {
            ip += 1 + ((ip - ii) >> 5);
        }
        if ip >= ip_end {
            break;
        }

        let dv = read_le32(src, ip);
        let slot = dindex(dv);
        let m_pos = base + dict.get(slot);
        dict.set(slot, ip - base);
        if m_pos >= ip || read_le32(src, m_pos) != dv {
            after_match = false;
            continue;
        }

        ii -= carried;
        carried = 0;
        let literals = ip - ii;
        if literals > 0 {
            put_literal_header(out, literals)?;
            out.extend(&src[ii..ip])?;
        }

        let mut m_len = 4;
        while ip + m_len < ip_end && src[ip + m_len] == src[m_pos + m_len] {
            m_len += 1;
        }
        let m_off = ip - m_pos;
        ip += m_len;
        ii = ip;
        put_match(out, m_len, m_off)?;
        after_match = true;
    }

    Ok(in_end - (ii - carried))
}

fn put_match(out: &mut Sink<'_>, m_len: usize, m_off: usize) -> Result<(), CompressError> {
    if m_len <= M2_MAX_LEN && m_off <= M2_MAX_OFFSET {
        let off = m_off - 1;
        out.put((((m_len - 1) << 5) | ((off & 7) << 2)) as u8)?;
        out.put((off >> 3) as u8)
    } else if m_off <= M3_MAX_OFFSET {
        let off = m_off - 1;
        if m_len <= M3_MAX_LEN {
            out.put(M3_MARKER | (m_len - 2) as u8)?;
        } else {
            out.put(M3_MARKER)?;
            out.put_count(m_len - M3_MAX_LEN)?;
        }
        out.put((off << 2) as u8)?;
        out.put((off >> 6) as u8)
    } else {
        let off = m_off - 0x4000;
        let high = ((off >> 11) & 8) as u8;
        if m_len <= M4_MAX_LEN {
            out.put(M4_MARKER | high | (m_len - 2) as u8)?;
        } else {
            out.put(M4_MARKER | high)?;
            out.put_count(m_len - M4_MAX_LEN)?;
        }
        out.put((off << 2) as u8)?;
        out.put((off >> 6) as u8)
    }
}

// ── Decompression ───────────────────────────────────────────────────────────

enum Step {
    /// Expecting a literal run or, after 0 trailing literals, any command.
    Top,
    /// Just copied a literal run of 4 or more bytes.
    AfterLiterals,
    /// Holding a match command in `t`.
    Match,
    /// Just copied a match; its offset bytes carry the trailing literal count.
    MatchDone,
    /// Copy `t` (1..=3) trailing literals, then read the next command.
    TrailingLiterals,
}

/// Decompress an LZO1X stream from `src` into `dst`.
///
/// `dst.len()` is the output capacity; its prior contents are never read.
/// On any failure the counts show how far the decoder got.
pub fn decompress(src: &[u8], dst: &mut [u8]) -> Decoded {
    let ip_end = src.len();
    let op_end = dst.len();
    let mut ip = 0usize;
    let mut op = 0usize;
    let mut t: usize;

    macro_rules! stop {
        ($status:expr) => {
            return Decoded {
                status: $status,
                consumed: ip,
                produced: op,
            }
        };
    }
    macro_rules! need_ip {
        ($n:expr) => {
            if ip_end - ip < $n {
                stop!(Status::InputOverrun);
            }
        };
    }
    macro_rules! need_op {
        ($n:expr) => {
            if op_end - op < $n {
                stop!(Status::OutputOverrun);
            }
        };
    }
    macro_rules! copy_literals {
        ($n:expr) => {{
            let n = $n;
            dst[op..op + n].copy_from_slice(&src[ip..ip + n]);
            op += n;
            ip += n;
        }};
    }
    macro_rules! copy_match {
        ($dist:expr, $n:expr) => {{
            let dist = $dist;
            if dist > op {
                stop!(Status::LookbehindOverrun);
            }
            let n = $n;
            need_op!(n);
            // Byte at a time: the source may overlap the bytes being written.
            for i in op..op + n {
                dst[i] = dst[i - dist];
            }
            op += n;
        }};
    }
    macro_rules! run_length {
        ($base:expr) => {{
            let mut len = 0usize;
            while src[ip] == 0 {
                len += 255;
                ip += 1;
                need_ip!(1);
            }
            len += $base + src[ip] as usize;
            ip += 1;
            len
        }};
    }

    need_ip!(1);
    let mut step = if src[0] > 17 {
        t = src[0] as usize - 17;
        ip = 1;
        if t < 4 {
            Step::TrailingLiterals
        } else {
            need_op!(t);
            need_ip!(t + 3);
            copy_literals!(t);
            Step::AfterLiterals
        }
    } else {
        t = 0;
        Step::Top
    };

    loop {
        step = match step {
            Step::Top => {
                need_ip!(3);
                t = src[ip] as usize;
                ip += 1;
                if t >= 16 {
                    Step::Match
                } else {
                    if t == 0 {
                        t = run_length!(15);
                    }
                    need_op!(t + 3);
                    need_ip!(t + 6);
                    copy_literals!(t + 3);
                    Step::AfterLiterals
                }
            }
            Step::AfterLiterals => {
                t = src[ip] as usize;
                ip += 1;
                if t >= 16 {
                    Step::Match
                } else {
                    let dist = 1 + M2_MAX_OFFSET + (t >> 2) + ((src[ip] as usize) << 2);
                    ip += 1;
                    copy_match!(dist, 3);
                    Step::MatchDone
                }
            }
            Step::Match => {
                if t >= 64 {
                    let dist = 1 + ((t >> 2) & 7) + ((src[ip] as usize) << 3);
                    ip += 1;
                    copy_match!(dist, (t >> 5) + 1);
                } else if t >= 32 {
                    let len = match t & 31 {
                        0 => {
                            let len = run_length!(31);
                            need_ip!(2);
                            len
                        }
                        short => short,
                    };
                    let dist = 1 + (read_le16(src, ip) >> 2);
                    ip += 2;
                    copy_match!(dist, len + 2);
                } else if t >= 16 {
                    let high = (t & 8) << 11;
                    let len = match t & 7 {
                        0 => {
                            let len = run_length!(7);
                            need_ip!(2);
                            len
                        }
                        short => short,
                    };
                    let dist = high + (read_le16(src, ip) >> 2);
                    ip += 2;
                    if dist == 0 {
                        break;
                    }
                    copy_match!(dist + 0x4000, len + 2);
                } else {
                    let dist = 1 + (t >> 2) + ((src[ip] as usize) << 2);
                    ip += 1;
                    copy_match!(dist, 2);
                }
                Step::MatchDone
            }
            Step::MatchDone => {
                t = (src[ip - 2] & 3) as usize;
                if t == 0 {
                    Step::Top
                } else {
                    Step::TrailingLiterals
                }
            }
            Step::TrailingLiterals => {
                need_op!(t);
                need_ip!(t + 3);
                copy_literals!(t);
                t = src[ip] as usize;
                ip += 1;
                Step::Match
            }
        };
    }

    let status = if ip == ip_end {
        Status::Ok
    } else {
        Status::InputNotConsumed
    };
    Decoded {
        status,
        consumed: ip,
        produced: op,
    }
}

#[inline]
fn read_le16(src: &[u8], at: usize) -> usize {
    u16::from_le_bytes([src[at], src[at + 1]]) as usize
}
