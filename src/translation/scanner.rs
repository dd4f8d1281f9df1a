#[derive(Clone, Copy)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

/// Closing byte for a quoted state, if `state` is one.
pub(super) fn closing_quote(state: State) -> Option<u8> {
    match state {
        State::SingleQuoted => Some(b'\''),
        State::DoubleQuoted => Some(b'"'),
        State::Bracketed => Some(b']'),
        _ => None,
    }
}
