//! Shell-word tokenizer for submitted command lines.
//!
//! Splits on whitespace with single-quote, double-quote, and backslash
//! handling. Shell constructs the engine does not grade (pipes, redirects,
//! chaining, substitution) are rejected outright -- the exercises compare
//! command intent, they never execute anything.

use crate::error::ParseError;

/// One shell word with the 1-based column it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub column: u32,
}

pub fn lex(src: &str) -> Result<Vec<Word>, ParseError> {
    let chars: Vec<char> = src.chars().collect();
    let mut words = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c == '\n' || c == '\r' {
            // Anything after a newline would be a second command.
            if chars[pos..].iter().any(|&ch| !ch.is_whitespace()) {
                return Err(ParseError::unsupported(
                    "multi-line command",
                    "submit a single command per exercise",
                ));
            }
            break;
        }

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        match c {
            '|' => return Err(unsupported_at("pipe")),
            '>' | '<' => return Err(unsupported_at("redirect")),
            ';' | '&' => return Err(unsupported_at("command chaining")),
            '`' => return Err(unsupported_at("command substitution")),
            '$' if chars.get(pos + 1) == Some(&'(') => {
                return Err(unsupported_at("command substitution"))
            }
            _ => {}
        }

        let start_column = (pos + 1) as u32;
        let mut word = String::new();

        while pos < chars.len() {
            let wc = chars[pos];
            match wc {
                c if c.is_whitespace() => break,
                '|' | '>' | '<' | ';' | '&' | '`' => break,
                '$' if chars.get(pos + 1) == Some(&'(') => break,
                '\'' => {
                    pos += 1;
                    loop {
                        match chars.get(pos) {
                            Some('\'') => {
                                pos += 1;
                                break;
                            }
                            Some(&inner) => {
                                word.push(inner);
                                pos += 1;
                            }
                            None => {
                                return Err(ParseError::syntax_at(
                                    1,
                                    start_column,
                                    "unterminated single quote",
                                ))
                            }
                        }
                    }
                }
                '"' => {
                    pos += 1;
                    loop {
                        match chars.get(pos) {
                            Some('"') => {
                                pos += 1;
                                break;
                            }
                            Some('\\') => {
                                pos += 1;
                                match chars.get(pos) {
                                    Some(&escaped) => {
                                        word.push(escaped);
                                        pos += 1;
                                    }
                                    None => {
                                        return Err(ParseError::syntax_at(
                                            1,
                                            start_column,
                                            "unterminated escape in double quote",
                                        ))
                                    }
                                }
                            }
                            Some(&inner) => {
                                word.push(inner);
                                pos += 1;
                            }
                            None => {
                                return Err(ParseError::syntax_at(
                                    1,
                                    start_column,
                                    "unterminated double quote",
                                ))
                            }
                        }
                    }
                }
                '\\' => {
                    pos += 1;
                    match chars.get(pos) {
                        Some(&escaped) => {
                            word.push(escaped);
                            pos += 1;
                        }
                        None => {
                            return Err(ParseError::syntax_at(
                                1,
                                start_column,
                                "trailing backslash",
                            ))
                        }
                    }
                }
                other => {
                    word.push(other);
                    pos += 1;
                }
            }
        }

        words.push(Word {
            text: word,
            column: start_column,
        });
    }

    Ok(words)
}

fn unsupported_at(construct: &str) -> ParseError {
    ParseError::unsupported(
        construct,
        format!("{} is not part of any graded exercise", construct),
    )
}
