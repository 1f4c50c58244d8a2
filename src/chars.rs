//! Character classification shared by the block and inline phases.

/// ASCII whitespace or control character, as used by link destinations.
#[inline]
pub fn is_ascii_whitespace_or_control(ch: char) -> bool {
    ch.is_ascii_whitespace() || ch.is_ascii_control()
}

/// Unicode whitespace per CommonMark: the `Zs` category plus tab,
/// line feed, form feed and carriage return.
#[inline]
pub fn is_unicode_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\x0c' | '\r') || (!ch.is_ascii() && ch.is_whitespace())
}

/// Unicode punctuation: ASCII punctuation plus the common non-ASCII
/// punctuation and symbol blocks.
pub fn is_unicode_punctuation(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_punctuation();
    }
    matches!(ch as u32,
        0x00A1..=0x00A9
            | 0x00AB..=0x00AC
            | 0x00AE..=0x00B1
            | 0x00B4
            | 0x00B6..=0x00B8
            | 0x00BB
            | 0x00BF
            | 0x00D7
            | 0x00F7
            | 0x037E
            | 0x0387
            | 0x055A..=0x055F
            | 0x0589..=0x058A
            | 0x05BE
            | 0x05C0
            | 0x05C3
            | 0x05C6
            | 0x05F3..=0x05F4
            | 0x0609..=0x060D
            | 0x061B
            | 0x061D..=0x061F
            | 0x066A..=0x066D
            | 0x06D4
            | 0x0964..=0x0965
            | 0x0970
            | 0x0E4F
            | 0x0E5A..=0x0E5B
            | 0x10FB
            | 0x1360..=0x1368
            | 0x166E
            | 0x169B..=0x169C
            | 0x16EB..=0x16ED
            | 0x2010..=0x2027
            | 0x2030..=0x205E
            | 0x207A..=0x207E
            | 0x208A..=0x208E
            | 0x20A0..=0x20C0
            | 0x2190..=0x23FF
            | 0x2500..=0x27FF
            | 0x2900..=0x2BFF
            | 0x2E00..=0x2E5D
            | 0x3001..=0x3003
            | 0x3008..=0x3011
            | 0x3014..=0x301F
            | 0x3030
            | 0x303D
            | 0x30A0
            | 0x30FB
            | 0xFE10..=0xFE19
            | 0xFE30..=0xFE52
            | 0xFE54..=0xFE6B
            | 0xFF01..=0xFF0F
            | 0xFF1A..=0xFF20
            | 0xFF3B..=0xFF40
            | 0xFF5B..=0xFF65
    )
}

/// Whether `s` is made only of spaces, tabs and line breaks.
#[inline]
pub fn is_whitespace_str(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}
