//! Token types for text analysis.
//!
//! A [`Token`] is the unit of text that flows through the analysis pipeline:
//! the tokenizer produces them, filters transform or mark them, and the
//! feature extractor consumes their text.
//!
//! # Examples
//!
//! ```
//! use taxon::analysis::token::Token;
//!
//! let token = Token::new("hello", 0);
//! assert_eq!(token.text, "hello");
//! assert_eq!(token.position, 0);
//! assert!(!token.is_stopped());
//! ```

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token.
    pub text: String,
    /// Position of this token in the stream (0-based).
    pub position: usize,
    /// Whether the token was marked for removal by a filter.
    pub stopped: bool,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            stopped: false,
        }
    }

    /// Check whether this token has been marked as stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }
}

/// A stream of tokens produced by a tokenizer or filter.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("search", 3);
        assert_eq!(token.text, "search");
        assert_eq!(token.position, 3);
        assert!(!token.is_stopped());
    }

    #[test]
    fn test_token_stop() {
        let token = Token::new("the", 0).stop();
        assert!(token.is_stopped());
    }
}
