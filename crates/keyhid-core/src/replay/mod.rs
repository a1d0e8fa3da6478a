// Keyhid Replay
// Key log tokenization for replaying logs onto the HID gadget

mod tokenizer;

pub use tokenizer::{
    LogTokenizer, ReadMode, StartAt, Token, TokenizeError, DEFAULT_POLL_INTERVAL, IGNORED_TOKENS,
};
