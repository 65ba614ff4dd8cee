//! The `content` property of `::before` and `::after`.
//!
//! [CSS Generated Content Module Level 3](https://www.w3.org/TR/css-content-3/)
//!
//! Values are tokenized with the string and escape rules of
//! [CSS Syntax § 4.3](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms),
//! then read as a list of content items.

use std::fmt;

use serde::Serialize;

/// Why a `content` value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentError(pub String);

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid content value: {}", self.0)
    }
}

impl std::error::Error for ContentError {}

/// Where a `target-counter()` points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "value")]
pub enum TargetRef {
    /// `url(#id)` or `"#id"`: a fragment identifier, without the `#`.
    Fragment(String),
    /// `attr(name)`: the fragment is read from the element's attribute.
    Attr(String),
}

/// One component of a `content` list.
///
/// [§ 1.2 'content'](https://www.w3.org/TR/css-content-3/#content-property)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum ContentItem {
    /// `<string>`
    Text {
        /// Unescaped string value.
        value: String,
    },
    /// `counter(name [, style])`
    Counter {
        /// Counter name.
        name: String,
        /// Counter style name, `decimal` when omitted.
        style: String,
    },
    /// `counters(name, separator [, style])`
    Counters {
        /// Counter name.
        name: String,
        /// String placed between nested values.
        separator: String,
        /// Counter style name, `decimal` when omitted.
        style: String,
    },
    /// `attr(name)`
    Attr {
        /// Attribute name.
        name: String,
    },
    /// `target-counter(url, name [, style])`
    TargetCounter {
        /// Element whose counter is read.
        target: TargetRef,
        /// Counter name; `page` reads the page number.
        counter: String,
        /// Counter style name, `decimal` when omitted.
        style: String,
    },
    /// `open-quote`
    OpenQuote,
    /// `close-quote`
    CloseQuote,
    /// `no-open-quote`: bumps the nesting level without rendering.
    NoOpenQuote,
    /// `no-close-quote`
    NoCloseQuote,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Ident(String),
    /// Function name and the tokens of its arguments, commas included.
    Function(String, Vec<Token>),
    Comma,
}

struct Tokenizer {
    input: Vec<char>,
    position: usize,
}

impl Tokenizer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    /// Tokens up to the end of input, or up to the `)` closing the current
    /// function when `nested`.
    fn tokens(&mut self, nested: bool) -> Result<Vec<Token>, ContentError> {
        let mut out = Vec::new();
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.position += 1;
            }
            let Some(c) = self.consume() else {
                if nested {
                    return Err(ContentError("unclosed function".to_string()));
                }
                return Ok(out);
            };
            match c {
                ')' if nested => return Ok(out),
                ')' => return Err(ContentError("unbalanced ')'".to_string())),
                '"' | '\'' => out.push(Token::Str(self.string(c)?)),
                ',' => out.push(Token::Comma),
                c if c.is_alphanumeric() || matches!(c, '-' | '_' | '#' | '.' | '/' | ':') => {
                    let mut word = c.to_string();
                    while let Some(next) = self.peek() {
                        if next.is_alphanumeric()
                            || matches!(next, '-' | '_' | '#' | '.' | '/' | ':')
                        {
                            word.push(next);
                            self.position += 1;
                        } else {
                            break;
                        }
                    }
                    if self.peek() == Some('(') {
                        self.position += 1;
                        let name = word.to_ascii_lowercase();
                        let args = if name == "url" {
                            self.url_argument()?
                        } else {
                            self.tokens(true)?
                        };
                        out.push(Token::Function(name, args));
                    } else {
                        out.push(Token::Ident(word));
                    }
                }
                other => return Err(ContentError(format!("unexpected '{other}'"))),
            }
        }
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    ///
    /// The argument of `url(...)`, quoted or not.
    fn url_argument(&mut self) -> Result<Vec<Token>, ContentError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
        if let Some(quote @ ('"' | '\'')) = self.peek() {
            self.position += 1;
            let value = self.string(quote)?;
            while self.peek().is_some_and(char::is_whitespace) {
                self.position += 1;
            }
            return match self.consume() {
                Some(')') => Ok(vec![Token::Str(value)]),
                _ => Err(ContentError("unclosed url()".to_string())),
            };
        }
        let mut value = String::new();
        loop {
            match self.consume() {
                Some(')') => return Ok(vec![Token::Str(value.trim_end().to_string())]),
                Some(c) => value.push(c),
                None => return Err(ContentError("unclosed url()".to_string())),
            }
        }
    }

    /// [§ 4.3.5 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn string(&mut self, ending: char) -> Result<String, ContentError> {
        let mut value = String::new();
        loop {
            match self.consume() {
                Some(c) if c == ending => return Ok(value),
                None => return Ok(value),
                Some('\n') => return Err(ContentError("newline in string".to_string())),
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => self.position += 1,
                    Some(_) => value.push(self.escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.13 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn escaped_code_point(&mut self) -> char {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 {
                    match self.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            hex.push(d);
                            self.position += 1;
                        }
                        _ => break,
                    }
                }
                // "If the next input code point is whitespace, consume it."
                if self.peek().is_some_and(char::is_whitespace) {
                    self.position += 1;
                }
                match u32::from_str_radix(&hex, 16) {
                    Ok(0) | Err(_) => '\u{FFFD}',
                    Ok(cp) => char::from_u32(cp).unwrap_or('\u{FFFD}'),
                }
            }
            None => '\u{FFFD}',
            Some(c) => c,
        }
    }
}

/// Arguments of a function, split at top-level commas.
fn arguments(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut args = vec![Vec::new()];
    for token in tokens {
        if token == Token::Comma {
            args.push(Vec::new());
        } else if let Some(last) = args.last_mut() {
            last.push(token);
        }
    }
    args
}

fn single_ident(arg: &[Token]) -> Option<String> {
    match arg {
        [Token::Ident(name)] => Some(name.clone()),
        _ => None,
    }
}

fn optional_style(arg: Option<&Vec<Token>>) -> Result<String, ContentError> {
    match arg {
        None => Ok("decimal".to_string()),
        Some(arg) => single_ident(arg)
            .map(|s| s.to_ascii_lowercase())
            .ok_or_else(|| ContentError("counter style must be an identifier".to_string())),
    }
}

/// [§ 3.3 target-counter()](https://www.w3.org/TR/css-gcpm-3/#target-counter)
fn target_ref(arg: &[Token]) -> Result<TargetRef, ContentError> {
    let fragment = |url: &str| {
        url.rsplit_once('#')
            .map(|(_, id)| TargetRef::Fragment(id.to_string()))
            .ok_or_else(|| ContentError(format!("target '{url}' has no fragment")))
    };
    match arg {
        [Token::Function(name, inner)] if name == "url" => match inner.as_slice() {
            [Token::Str(url)] => fragment(url),
            _ => Err(ContentError("malformed url()".to_string())),
        },
        [Token::Str(url)] => fragment(url),
        [Token::Function(name, inner)] if name == "attr" => single_ident(inner)
            .map(TargetRef::Attr)
            .ok_or_else(|| ContentError("malformed attr()".to_string())),
        _ => Err(ContentError("target must be url(), a string or attr()".to_string())),
    }
}

fn function_item(name: &str, tokens: Vec<Token>) -> Result<ContentItem, ContentError> {
    let args = arguments(tokens);
    let bad = || ContentError(format!("malformed {name}()"));
    match name {
        "counter" if (1..=2).contains(&args.len()) => Ok(ContentItem::Counter {
            name: single_ident(&args[0]).ok_or_else(bad)?,
            style: optional_style(args.get(1))?,
        }),
        "counters" if (2..=3).contains(&args.len()) => {
            let separator = match args[1].as_slice() {
                [Token::Str(s)] => s.clone(),
                _ => return Err(bad()),
            };
            Ok(ContentItem::Counters {
                name: single_ident(&args[0]).ok_or_else(bad)?,
                separator,
                style: optional_style(args.get(2))?,
            })
        }
        "attr" if args.len() == 1 => Ok(ContentItem::Attr {
            name: single_ident(&args[0]).ok_or_else(bad)?,
        }),
        "target-counter" if (2..=3).contains(&args.len()) => Ok(ContentItem::TargetCounter {
            target: target_ref(&args[0])?,
            counter: single_ident(&args[1]).ok_or_else(bad)?,
            style: optional_style(args.get(2))?,
        }),
        _ => Err(bad()),
    }
}

/// Parse a `content` value.
///
/// Returns `Ok(None)` for `none` and `normal`, which generate no box on
/// `::before` and `::after`.
///
/// # Errors
///
/// Returns [`ContentError`] for unbalanced or unknown functions and tokens
/// that are not content items.
pub fn parse_content(text: &str) -> Result<Option<Vec<ContentItem>>, ContentError> {
    let tokens = Tokenizer::new(text).tokens(false)?;
    if let [Token::Ident(word)] = tokens.as_slice()
        && matches!(word.to_ascii_lowercase().as_str(), "none" | "normal")
    {
        return Ok(None);
    }
    if tokens.is_empty() {
        return Err(ContentError("empty value".to_string()));
    }
    let mut items = Vec::with_capacity(tokens.len());
    for token in tokens {
        let item = match token {
            Token::Str(value) => ContentItem::Text { value },
            Token::Function(name, args) => function_item(&name, args)?,
            Token::Ident(word) => match word.to_ascii_lowercase().as_str() {
                "open-quote" => ContentItem::OpenQuote,
                "close-quote" => ContentItem::CloseQuote,
                "no-open-quote" => ContentItem::NoOpenQuote,
                "no-close-quote" => ContentItem::NoCloseQuote,
                _ => return Err(ContentError(format!("unknown keyword '{word}'"))),
            },
            Token::Comma => return Err(ContentError("unexpected ','".to_string())),
        };
        items.push(item);
    }
    Ok(Some(items))
}

/// [§ 2.1 'quotes'](https://www.w3.org/TR/css-content-3/#quotes)
///
/// The UA quote pairs, outermost first; deeper levels repeat the last pair.
pub const QUOTES: [(&str, &str); 2] = [("\u{201C}", "\u{201D}"), ("\u{2018}", "\u{2019}")];

/// Quote mark for `depth` (0 = outermost).
#[must_use]
pub fn quote_mark(depth: usize, open: bool) -> &'static str {
    let (o, c) = QUOTES[depth.min(QUOTES.len() - 1)];
    if open { o } else { c }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(text: &str) -> Vec<ContentItem> {
        parse_content(text)
            .expect("valid content")
            .expect("generates a box")
    }

    #[test]
    fn test_strings_keep_spaces_and_escapes() {
        assert_eq!(
            items(r#""Chapter " 'a\'b' "\A" "\2014 x""#),
            vec![
                ContentItem::Text { value: "Chapter ".to_string() },
                ContentItem::Text { value: "a'b".to_string() },
                ContentItem::Text { value: "\n".to_string() },
                ContentItem::Text { value: "\u{2014}x".to_string() },
            ]
        );
    }

    #[test]
    fn test_counter_functions() {
        assert_eq!(
            items("counter(chapter, upper-roman) counters(item, '.')"),
            vec![
                ContentItem::Counter {
                    name: "chapter".to_string(),
                    style: "upper-roman".to_string(),
                },
                ContentItem::Counters {
                    name: "item".to_string(),
                    separator: ".".to_string(),
                    style: "decimal".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_target_counter_forms() {
        let expect = |target: TargetRef| ContentItem::TargetCounter {
            target,
            counter: "page".to_string(),
            style: "decimal".to_string(),
        };
        assert_eq!(
            items("target-counter(url(#intro), page)"),
            vec![expect(TargetRef::Fragment("intro".to_string()))]
        );
        assert_eq!(
            items("target-counter('doc.html#intro', page)"),
            vec![expect(TargetRef::Fragment("intro".to_string()))]
        );
        assert_eq!(
            items("target-counter(attr(href), page)"),
            vec![expect(TargetRef::Attr("href".to_string()))]
        );
    }

    #[test]
    fn test_none_and_errors() {
        assert_eq!(parse_content("none"), Ok(None));
        assert_eq!(parse_content("normal"), Ok(None));
        assert!(parse_content("counter(").is_err());
        assert!(parse_content("counter(a b)").is_err());
        assert!(parse_content("bogus").is_err());
        assert!(parse_content("").is_err());
        assert!(parse_content("target-counter(url(intro), page)").is_err());
    }

    #[test]
    fn test_quote_depths() {
        assert_eq!(quote_mark(0, true), "\u{201C}");
        assert_eq!(quote_mark(5, false), "\u{2019}");
    }
}
