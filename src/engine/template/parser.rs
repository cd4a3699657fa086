//! Template parser
//!
//! Turns the token stream into a small tree of nodes. Supported tags:
//! `{{ name }}`, `{% if [not] name %}...{% else %}...{% endif %}` and
//! `{% for item in name %}...{% endfor %}`.

use super::lexer::{Token, TokenKind};
use crate::kit::error::TemplateError;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Output {
        name: String,
        line: usize,
    },
    If {
        name: String,
        negated: bool,
        line: usize,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    For {
        item: String,
        list: String,
        line: usize,
        body: Vec<Node>,
    },
}

/// Parse a token stream produced by [`super::lexer::tokenize`]
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Node>, TemplateError> {
    let mut parser = Parser { tokens, pos: 0 };
    let (nodes, _) = parser.parse_body(&[])?;
    Ok(nodes)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token {
            kind: TokenKind::Eof,
            line: self.tokens.last().map(|t| t.line).unwrap_or(1),
        });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Parse nodes until one of `end_tags` (returned) or the end of input
    fn parse_body(
        &mut self,
        end_tags: &[&str],
    ) -> Result<(Vec<Node>, Option<String>), TemplateError> {
        let mut nodes = Vec::new();
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Data(text) => nodes.push(Node::Text(text)),
                TokenKind::VariableBegin => {
                    let (name, line) = self.expect_name()?;
                    self.expect(TokenKind::VariableEnd)?;
                    nodes.push(Node::Output { name, line });
                }
                TokenKind::BlockBegin => {
                    let tag = self.next();
                    let TokenKind::Name(tag_name) = tag.kind else {
                        return Err(TemplateError::syntax("tag name expected", tag.line));
                    };
                    if end_tags.contains(&tag_name.as_str()) {
                        self.expect(TokenKind::BlockEnd)?;
                        return Ok((nodes, Some(tag_name)));
                    }
                    match tag_name.as_str() {
                        "if" => nodes.push(self.parse_if(tag.line)?),
                        "for" => nodes.push(self.parse_for(tag.line)?),
                        other => {
                            return Err(TemplateError::syntax(
                                format!("Encountered unknown tag '{}'.", other),
                                tag.line,
                            ))
                        }
                    }
                }
                TokenKind::Eof if end_tags.is_empty() => return Ok((nodes, None)),
                TokenKind::Eof => {
                    let expected: Vec<String> =
                        end_tags.iter().map(|t| format!("'{}'", t)).collect();
                    return Err(TemplateError::syntax(
                        format!(
                            "unexpected end of template, expected {}",
                            expected.join(" or ")
                        ),
                        token.line,
                    ));
                }
                other => {
                    return Err(TemplateError::syntax(
                        format!("unexpected '{}'", other.describe()),
                        token.line,
                    ))
                }
            }
        }
    }

    fn parse_if(&mut self, line: usize) -> Result<Node, TemplateError> {
        let (mut name, _) = self.expect_name()?;
        let mut negated = false;
        if name == "not" {
            negated = true;
            name = self.expect_name()?.0;
        }
        self.expect(TokenKind::BlockEnd)?;

        let (then, end) = self.parse_body(&["else", "endif"])?;
        let otherwise = if end.as_deref() == Some("else") {
            self.parse_body(&["endif"])?.0
        } else {
            Vec::new()
        };
        Ok(Node::If {
            name,
            negated,
            line,
            then,
            otherwise,
        })
    }

    fn parse_for(&mut self, line: usize) -> Result<Node, TemplateError> {
        let (item, _) = self.expect_name()?;
        let keyword = self.next();
        if keyword.kind != TokenKind::Name("in".to_string()) {
            return Err(TemplateError::syntax(
                format!("expected token 'in', got '{}'", keyword.kind.describe()),
                keyword.line,
            ));
        }
        let (list, _) = self.expect_name()?;
        self.expect(TokenKind::BlockEnd)?;
        let (body, _) = self.parse_body(&["endfor"])?;
        Ok(Node::For {
            item,
            list,
            line,
            body,
        })
    }

    fn expect_name(&mut self) -> Result<(String, usize), TemplateError> {
        let token = self.next();
        match token.kind {
            TokenKind::Name(name) => Ok((name, token.line)),
            other => Err(TemplateError::syntax(
                format!("unexpected '{}'", other.describe()),
                token.line,
            )),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), TemplateError> {
        let token = self.next();
        if token.kind == kind {
            Ok(())
        } else {
            Err(TemplateError::syntax(
                format!(
                    "expected token '{}', got '{}'",
                    kind.describe(),
                    token.kind.describe()
                ),
                token.line,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::template::lexer::tokenize;

    fn parse_str(source: &str) -> Result<Vec<Node>, TemplateError> {
        parse(tokenize(source)?)
    }

    #[test]
    fn test_parse_output() {
        assert_eq!(
            parse_str("WTF {{author}}?").unwrap(),
            vec![
                Node::Text("WTF ".to_string()),
                Node::Output {
                    name: "author".to_string(),
                    line: 1
                },
                Node::Text("?".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_expression() {
        assert_eq!(
            parse_str("Thank you {{"),
            Err(TemplateError::syntax("unexpected 'end of template'", 1))
        );
    }

    #[test]
    fn test_missing_closer() {
        assert_eq!(
            parse_str("Hi {{ author"),
            Err(TemplateError::syntax(
                "expected token 'end of print statement', got 'end of template'",
                1
            ))
        );
        assert_eq!(
            parse_str("Hi {{ author title }}"),
            Err(TemplateError::syntax(
                "expected token 'end of print statement', got 'title'",
                1
            ))
        );
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(
            parse_str("{{ }}"),
            Err(TemplateError::syntax("unexpected 'end of print statement'", 1))
        );
    }

    #[test]
    fn test_parse_if_else() {
        let nodes = parse_str("{% if not label %}none{% else %}some{% endif %}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::If {
                name: "label".to_string(),
                negated: true,
                line: 1,
                then: vec![Node::Text("none".to_string())],
                otherwise: vec![Node::Text("some".to_string())],
            }]
        );
    }

    #[test]
    fn test_parse_for() {
        let nodes = parse_str("{% for l in label %}[{{ l }}]{% endfor %}").unwrap();
        match &nodes[0] {
            Node::For {
                item, list, body, ..
            } => {
                assert_eq!(item, "l");
                assert_eq!(list, "label");
                assert_eq!(body.len(), 3);
            }
            other => panic!("Expected For node, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_block() {
        assert_eq!(
            parse_str("{% if label %}\nyes\n"),
            Err(TemplateError::syntax(
                "unexpected end of template, expected 'else' or 'endif'",
                3
            ))
        );
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            parse_str("ok\n{% include header %}"),
            Err(TemplateError::syntax("Encountered unknown tag 'include'.", 2))
        );
        assert_eq!(
            parse_str("{% endif %}"),
            Err(TemplateError::syntax("Encountered unknown tag 'endif'.", 1))
        );
    }

    #[test]
    fn test_for_requires_in() {
        assert_eq!(
            parse_str("{% for l of label %}{% endfor %}"),
            Err(TemplateError::syntax("expected token 'in', got 'of'", 1))
        );
    }
}
