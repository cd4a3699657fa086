//! Template tokenizer
//!
//! Splits a message template into literal data and the tokens found
//! inside `{{ ... }}` and `{% ... %}` tags. Comments (`{# ... #}`) are
//! dropped here.

use crate::kit::error::TemplateError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Data(String),
    VariableBegin,
    VariableEnd,
    BlockBegin,
    BlockEnd,
    Name(String),
    Eof,
}

/// A token and the 1-based line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl TokenKind {
    /// Human readable name used in syntax errors
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Data(_) => "template data".to_string(),
            TokenKind::VariableBegin => "begin of print statement".to_string(),
            TokenKind::VariableEnd => "end of print statement".to_string(),
            TokenKind::BlockBegin => "begin of statement block".to_string(),
            TokenKind::BlockEnd => "end of statement block".to_string(),
            TokenKind::Name(name) => name.clone(),
            TokenKind::Eof => "end of template".to_string(),
        }
    }
}

/// Tokenize a template source. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut lexer = Lexer {
        rest: source,
        line: 1,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    rest: &'a str,
    line: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), TemplateError> {
        while !self.rest.is_empty() {
            let rest = self.rest;
            match rest.find('{').map(|i| (i, &rest[i..])) {
                Some((i, tail))
                    if tail.starts_with("{{") || tail.starts_with("{%") || tail.starts_with("{#") =>
                {
                    self.data(i);
                    if tail.starts_with("{#") {
                        self.comment()?;
                    } else {
                        let kind = if tail.starts_with("{{") {
                            TokenKind::VariableBegin
                        } else {
                            TokenKind::BlockBegin
                        };
                        let end = if kind == TokenKind::VariableBegin {
                            "}}"
                        } else {
                            "%}"
                        };
                        self.push(kind);
                        self.advance(2);
                        self.tag(end)?;
                    }
                }
                Some((i, _)) => {
                    // A lone `{` is ordinary text
                    self.data(i + 1);
                }
                None => self.data(self.rest.len()),
            }
        }
        self.push(TokenKind::Eof);
        Ok(())
    }

    /// Emit the next `len` bytes as data, merging with a preceding data token
    fn data(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let text = &self.rest[..len];
        match self.tokens.last_mut() {
            Some(Token {
                kind: TokenKind::Data(existing),
                ..
            }) => existing.push_str(text),
            _ => self.push(TokenKind::Data(text.to_string())),
        }
        self.advance(len);
    }

    fn comment(&mut self) -> Result<(), TemplateError> {
        let start = self.line;
        match self.rest[2..].find("#}") {
            Some(end) => {
                self.advance(end + 4);
                Ok(())
            }
            None => Err(TemplateError::syntax("missing end of comment tag", start)),
        }
    }

    /// Tokenize the inside of a tag until its closing delimiter (or EOF)
    fn tag(&mut self, end: &str) -> Result<(), TemplateError> {
        loop {
            let trimmed = self.rest.trim_start();
            let skipped = self.rest.len() - trimmed.len();
            self.advance(skipped);

            if self.rest.is_empty() {
                return Ok(());
            }
            if self.rest.starts_with(end) {
                let kind = if end == "}}" {
                    TokenKind::VariableEnd
                } else {
                    TokenKind::BlockEnd
                };
                self.push(kind);
                self.advance(2);
                return Ok(());
            }
            // Mismatched closer: hand it to the parser, which reports it
            if self.rest.starts_with("}}") || self.rest.starts_with("%}") {
                let kind = if self.rest.starts_with("}}") {
                    TokenKind::VariableEnd
                } else {
                    TokenKind::BlockEnd
                };
                self.push(kind);
                self.advance(2);
                return Ok(());
            }

            let first = self.rest.chars().next().unwrap_or_default();
            if first.is_ascii_alphabetic() || first == '_' {
                let len = self
                    .rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(self.rest.len());
                let name = self.rest[..len].to_string();
                self.push(TokenKind::Name(name));
                self.advance(len);
            } else {
                return Err(TemplateError::syntax(
                    format!("unexpected char '{}'", first),
                    self.line,
                ));
            }
        }
    }

    fn push(&mut self, kind: TokenKind) {
        self.tokens.push(Token {
            kind,
            line: self.line,
        });
    }

    /// Consume `len` bytes, keeping the line counter current
    fn advance(&mut self, len: usize) {
        self.line += self.rest[..len].matches('\n').count();
        self.rest = &self.rest[len..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            kinds("Thank you"),
            vec![TokenKind::Data("Thank you".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_variable_tag() {
        assert_eq!(
            kinds("WTF {{ author }}?"),
            vec![
                TokenKind::Data("WTF ".to_string()),
                TokenKind::VariableBegin,
                TokenKind::Name("author".to_string()),
                TokenKind::VariableEnd,
                TokenKind::Data("?".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_tag_reaches_eof() {
        assert_eq!(
            kinds("Thank you {{"),
            vec![
                TokenKind::Data("Thank you ".to_string()),
                TokenKind::VariableBegin,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_brace_is_data() {
        assert_eq!(
            kinds("a { b } c"),
            vec![TokenKind::Data("a { b } c".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_comment_is_dropped() {
        assert_eq!(
            kinds("a{# note #}b"),
            vec![TokenKind::Data("ab".to_string()), TokenKind::Eof]
        );
        assert_eq!(
            tokenize("a\n{# never closed"),
            Err(TemplateError::syntax("missing end of comment tag", 2))
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("line one\nline two {{ author }}\n{% if label %}").unwrap();
        let name = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Name("author".to_string()))
            .unwrap();
        assert_eq!(name.line, 2);
        assert_eq!(tokens.last().unwrap().line, 3);
    }

    #[test]
    fn test_unexpected_char() {
        assert_eq!(
            tokenize("{{ $x }}"),
            Err(TemplateError::syntax("unexpected char '$'", 1))
        );
    }
}
