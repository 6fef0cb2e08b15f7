//! Parser turning template source into a [`Fragment`].
//!
//! Sections are matched with a stack: an opening tag pushes a section, an
//! else tag switches the section to its inverse branch, and a closing tag
//! pops it, attaches the collected nodes and hands the block to the parent.

use crate::ast::{Block, Escape, Fragment, Hash, Node, Param, Partial, Variable};
use crate::error::SyntaxError;
use crate::tokenizer::{Delimiters, TagKind, Token, Tokenizer};

/// Parses template source using the default `{{`/`}}` delimiters.
///
/// # Example
///
/// ```rust
/// use whisker_syntax::{parse, Node};
///
/// let fragment = parse("Hello {{name}}!").unwrap();
/// assert_eq!(fragment.nodes().len(), 3);
/// assert!(matches!(fragment.nodes()[1], Node::Variable(_)));
/// ```
pub fn parse(source: &str) -> Result<Fragment, SyntaxError> {
    parse_tokens(Tokenizer::new(source))
}

/// Parses template source starting with custom delimiters.
pub fn parse_with_delimiters(
    source: &str,
    start: &str,
    end: &str,
) -> Result<Fragment, SyntaxError> {
    if start.is_empty() || end.is_empty() {
        return Err(SyntaxError::parse("delimiters must not be empty", (1, 1)));
    }
    let delimiters = Delimiters {
        start: start.to_string(),
        end: end.to_string(),
    };
    parse_tokens(Tokenizer::with_delimiters(source, delimiters))
}

/// A section whose closing tag has not been seen yet.
struct OpenSection {
    block: Block,
    body: Vec<Node>,
    inverse: Option<Vec<Node>>,
    position: (usize, usize),
}

impl OpenSection {
    fn nodes(&mut self) -> &mut Vec<Node> {
        match &mut self.inverse {
            Some(inverse) => inverse,
            None => &mut self.body,
        }
    }
}

fn current<'s>(root: &'s mut Vec<Node>, stack: &'s mut [OpenSection]) -> &'s mut Vec<Node> {
    match stack.last_mut() {
        Some(open) => open.nodes(),
        None => root,
    }
}

fn parse_tokens(tokenizer: Tokenizer<'_>) -> Result<Fragment, SyntaxError> {
    let mut root = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();

    for token in tokenizer {
        let (kind, content, position, delimiters) = match token? {
            Token::Text(text) => {
                current(&mut root, &mut stack).push(Node::Literal(text.to_string()));
                continue;
            }
            Token::Tag {
                kind,
                content,
                position,
                delimiters,
            } => (kind, content, position, delimiters),
        };

        match kind {
            TagKind::Comment => {
                current(&mut root, &mut stack).push(Node::Comment(content.to_string()));
            }
            TagKind::Inverted if content.is_empty() => else_branch(&mut stack, position)?,
            TagKind::Escaped if content == "else" => else_branch(&mut stack, position)?,
            TagKind::Section | TagKind::Inverted => {
                let (name, params, hash) = parse_expression(content, position)?;
                let block = Block::new(name, kind == TagKind::Inverted, params, hash)?
                    .with_delimiters(delimiters.start, delimiters.end);
                stack.push(OpenSection {
                    block,
                    body: Vec::new(),
                    inverse: None,
                    position,
                });
            }
            TagKind::Close => {
                let Some(open) = stack.pop() else {
                    return Err(SyntaxError::parse(
                        format!("unexpected closing tag '{}'", content),
                        position,
                    ));
                };
                if open.block.name() != content {
                    return Err(SyntaxError::parse(
                        format!(
                            "section '{}' closed by '{}'",
                            open.block.name(),
                            content
                        ),
                        position,
                    ));
                }
                let mut block = open.block;
                block.set_body(Fragment::new(open.body))?;
                if let Some(inverse) = open.inverse {
                    block.set_inverse(Fragment::new(inverse));
                }
                current(&mut root, &mut stack).push(Node::Block(block));
            }
            TagKind::Partial => {
                let path = content
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| SyntaxError::parse("partial path is required", position))?;
                current(&mut root, &mut stack).push(Node::Partial(Partial::new(path)));
            }
            TagKind::Escaped | TagKind::Triple | TagKind::Ampersand => {
                let (name, params, hash) = parse_expression(content, position)?;
                let escape = match kind {
                    TagKind::Triple => Escape::Triple,
                    TagKind::Ampersand => Escape::Ampersand,
                    _ => Escape::Html,
                };
                current(&mut root, &mut stack).push(Node::Variable(Variable {
                    name,
                    params,
                    hash,
                    escape,
                }));
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(SyntaxError::parse(
            format!("unclosed section '{}'", open.block.name()),
            open.position,
        ));
    }

    Ok(Fragment::new(root))
}

fn else_branch(stack: &mut [OpenSection], position: (usize, usize)) -> Result<(), SyntaxError> {
    let Some(open) = stack.last_mut() else {
        return Err(SyntaxError::parse("'else' outside of a section", position));
    };
    if open.inverse.is_some() {
        return Err(SyntaxError::parse(
            format!("section '{}' has more than one 'else'", open.block.name()),
            position,
        ));
    }
    open.inverse = Some(Vec::new());
    Ok(())
}

/// Splits `name arg key=value ...` into its name, positional and named arguments.
fn parse_expression(
    content: &str,
    position: (usize, usize),
) -> Result<(String, Vec<Param>, Hash), SyntaxError> {
    let words = split_words(content)
        .ok_or_else(|| SyntaxError::parse("unterminated string literal", position))?;
    let mut words = words.into_iter();

    let name = words
        .next()
        .ok_or_else(|| SyntaxError::parse("empty tag", position))?;
    if unquote(name).is_some() {
        return Err(SyntaxError::parse(
            format!("expected a name, found {}", name),
            position,
        ));
    }

    let mut params = Vec::new();
    let mut hash = Hash::new();
    for word in words {
        match hash_pair(word) {
            Some((key, value)) => {
                if hash.insert(key.to_string(), parse_param(value)).is_some() {
                    return Err(SyntaxError::parse(
                        format!("duplicate argument '{}'", key),
                        position,
                    ));
                }
            }
            None => params.push(parse_param(word)),
        }
    }

    Ok((name.to_string(), params, hash))
}

/// Splits on whitespace, keeping quoted strings together.
///
/// Returns `None` if a quote is left open.
fn split_words(content: &str) -> Option<Vec<&str>> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (i, c) in content.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                words.push(&content[s..i]);
            }
            continue;
        }
        if start.is_none() {
            start = Some(i);
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
    }

    if quote.is_some() {
        return None;
    }
    if let Some(s) = start {
        words.push(&content[s..]);
    }
    Some(words)
}

fn unquote(word: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|q| {
        if word.len() >= 2 && word.starts_with(q) && word.ends_with(q) {
            Some(&word[1..word.len() - 1])
        } else {
            None
        }
    })
}

fn hash_pair(word: &str) -> Option<(&str, &str)> {
    let (key, value) = word.split_once('=')?;
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '@');
    valid_key.then_some((key, value))
}

fn parse_param(word: &str) -> Param {
    if let Some(s) = unquote(word) {
        return Param::Str(s.to_string());
    }
    match word {
        "true" => return Param::Bool(true),
        "false" => return Param::Bool(false),
        "null" => return Param::Null,
        _ => {}
    }
    if let Ok(n) = word.parse::<i64>() {
        return Param::Int(n);
    }
    if word.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        if let Ok(n) = word.parse::<f64>() {
            return Param::Float(n);
        }
    }
    Param::Path(word.to_string())
}
