use bytes::{BufMut, Bytes, BytesMut};

pub const OURS_MARKER: &str = "<<<<<<< ours";
pub const SEPARATOR_MARKER: &str = "=======";
pub const THEIRS_MARKER: &str = ">>>>>>> theirs";

/// Wrap both versions of a conflicted file in conflict markers
///
/// An absent side contributes no lines. A side that does not end with a
/// newline gets one so the next marker starts on its own line.
pub fn render_conflict(ours: &[u8], theirs: &[u8]) -> Bytes {
    let mut content = BytesMut::with_capacity(ours.len() + theirs.len() + 48);

    content.put_slice(OURS_MARKER.as_bytes());
    content.put_u8(b'\n');
    put_side(&mut content, ours);
    content.put_slice(SEPARATOR_MARKER.as_bytes());
    content.put_u8(b'\n');
    put_side(&mut content, theirs);
    content.put_slice(THEIRS_MARKER.as_bytes());
    content.put_u8(b'\n');

    content.freeze()
}

fn put_side(content: &mut BytesMut, side: &[u8]) {
    content.put_slice(side);
    if !side.is_empty() && !side.ends_with(b"\n") {
        content.put_u8(b'\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(b"B", b"C", "<<<<<<< ours\nB\n=======\nC\n>>>>>>> theirs\n")]
    #[case(b"B\n", b"C\n", "<<<<<<< ours\nB\n=======\nC\n>>>>>>> theirs\n")]
    #[case(b"B\n", b"", "<<<<<<< ours\nB\n=======\n>>>>>>> theirs\n")]
    #[case(b"", b"one\ntwo", "<<<<<<< ours\n=======\none\ntwo\n>>>>>>> theirs\n")]
    fn wraps_both_sides_in_markers(
        #[case] ours: &[u8],
        #[case] theirs: &[u8],
        #[case] expected: &str,
    ) {
        assert_eq!(render_conflict(ours, theirs), expected.as_bytes());
    }
}
