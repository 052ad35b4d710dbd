//! # Scale Line Protocol
//!
//! The indicator streams ASCII lines such as `"ST,GS,  12.34 kg\r\n"`, with
//! the occasional control byte and some noise around zero. A reading is the
//! leftmost token of the shape
//!
//! ```text
//! [-] [spaces] digits '.' 1-2 digits [spaces] unit
//! ```
//!
//! after every byte outside printable ASCII (0x20..=0x7E) has been dropped.

use shared_types::Weight;

/// Extract the weight from one raw line. Negative readings clamp to zero.
#[must_use]
pub fn parse_weight_line(raw: &[u8], unit: &str) -> Option<Weight> {
    let cleaned: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| (0x20..=0x7E).contains(b))
        .collect();

    (0..cleaned.len())
        .find_map(|start| match_at(&cleaned, start, unit.as_bytes()))
        .map(Weight::clamp_non_negative)
}

fn skip_while(line: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < line.len() && pred(line[pos]) {
        pos += 1;
    }
    pos
}

fn match_at(line: &[u8], start: usize, unit: &[u8]) -> Option<Weight> {
    let negative = line[start] == b'-';
    let mut pos = if negative { start + 1 } else { start };
    pos = skip_while(line, pos, |b| b == b' ');

    let int_start = pos;
    pos = skip_while(line, pos, |b| b.is_ascii_digit());
    if pos == int_start || line.get(pos) != Some(&b'.') {
        return None;
    }

    let frac_start = pos + 1;
    let frac_end = skip_while(line, frac_start, |b| b.is_ascii_digit());
    if !(1..=2).contains(&(frac_end - frac_start)) {
        return None;
    }

    let unit_start = skip_while(line, frac_end, |b| b == b' ');
    if !line[unit_start..].starts_with(unit) {
        return None;
    }

    let number = std::str::from_utf8(&line[int_start..frac_end]).ok()?;
    let magnitude: Weight = number.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
