//! Recursive-descent parser for definition source.
//!
//! ```text
//! Definitions    := ('type' IDENT '=' TypeExpression)*
//! TypeExpression := 'array' | 'boolean' | 'number' | 'object' | 'string'
//!                 | 'true' | 'false' | NUMBER | STRING
//!                 | 'enumeration' '{' Word+ '}'
//!                 | '{' (Word (':' TypeExpression)?)+ '}'
//! Word           := IDENT | STRING | keyword
//! ```
//!
//! Tokens are pulled from the lexer one at a time with a single token of
//! lookahead; a lex error surfaces at the point the parser reaches it.
use tracing::debug;

use crate::error::{Error, Location, ParseError, Result};
use crate::ir::{Field, Ty};
use crate::lexer::{Lexer, Spanned, Token};
use crate::stack::ensure_sufficient_stack;

// ------------------------------- Policy ---------------------------------- //

/// Deepest accepted nesting of object patterns.
pub const MAX_NESTING_DEPTH: usize = 256;

// ------------------------------- Parser ---------------------------------- //

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Option<Spanned>,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next().transpose()?;
        Ok(Self { lexer, current, depth: 0 })
    }

    // -------------------------------------------------------------------------
    // Token access
    // -------------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.current.as_ref().map(|s| &s.token)
    }

    fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Consume the current token and pull the next one.
    fn bump(&mut self) -> Result<Option<Spanned>> {
        let next = self.lexer.next().transpose()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Position of the current token, or of end of input.
    fn at(&self) -> Location {
        let offset = match &self.current {
            Some(spanned) => spanned.span.start,
            None => self.lexer.source().len(),
        };
        self.lexer.location(offset)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = match self.peek() {
            Some(token) => token.to_string(),
            None => "end of input".to_owned(),
        };
        ParseError::Unexpected {
            expected: expected.to_owned(),
            found,
            at: self.at(),
        }
        .into()
    }

    fn expect(&mut self, want: &Token, expected: &str) -> Result<()> {
        if self.peek() == Some(want) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// A bare identifier, quoted string or keyword used as a name.
    fn word(&self) -> Option<String> {
        match self.peek()? {
            Token::Ident(w) | Token::String(w) => Some(w.clone()),
            token => token.keyword().map(str::to_owned),
        }
    }

    // -------------------------------------------------------------------------
    // Grammar
    // -------------------------------------------------------------------------

    pub fn parse_definitions(&mut self) -> Result<Vec<(String, Ty)>> {
        let mut definitions = Vec::new();
        while !self.is_at_end() {
            definitions.push(self.parse_declaration()?);
        }
        debug!(count = definitions.len(), "parsed type definitions");
        Ok(definitions)
    }

    fn parse_declaration(&mut self) -> Result<(String, Ty)> {
        self.expect(&Token::Type, "keyword `type`")?;
        let name = match self.peek() {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(self.unexpected("type name")),
        };
        self.bump()?;
        self.expect(&Token::Eq, "`=`")?;
        let ty = self.parse_type_expression()?;
        Ok((name, ty))
    }

    pub fn parse_type_expression(&mut self) -> Result<Ty> {
        ensure_sufficient_stack(|| {
            let ty = match self.peek() {
                Some(Token::Array) => Ty::Array,
                Some(Token::Boolean) => Ty::Boolean,
                Some(Token::NumberType) => Ty::Number,
                Some(Token::Object) => Ty::Object,
                Some(Token::StringType) => Ty::String,
                Some(Token::True) => Ty::BooleanLiteral(true),
                Some(Token::False) => Ty::BooleanLiteral(false),
                Some(Token::Number(n)) => Ty::NumberLiteral(n.clone()),
                Some(Token::String(s)) => Ty::StringLiteral(s.clone()),
                Some(Token::Enumeration) => return self.parse_enumeration(),
                Some(Token::LBrace) => return self.parse_object_pattern(),
                _ => return Err(self.unexpected("a type expression")),
            };
            self.bump()?;
            Ok(ty)
        })
    }

    fn parse_enumeration(&mut self) -> Result<Ty> {
        self.bump()?; // `enumeration`
        let open = self.at();
        self.expect(&Token::LBrace, "`{`")?;

        let mut members: Vec<String> = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            let Some(member) = self.word() else {
                return Err(self.unexpected("enumeration member or `}`"));
            };
            self.bump()?;
            if !members.contains(&member) {
                members.push(member);
            }
        }
        if members.is_empty() {
            return Err(ParseError::EmptyEnumeration { at: open }.into());
        }
        self.bump()?; // `}`
        Ok(Ty::Enumeration(members))
    }

    fn parse_object_pattern(&mut self) -> Result<Ty> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                at: self.at(),
            }
            .into());
        }
        self.bump()?; // `{`
        self.depth += 1;
        let fields = self.parse_fields();
        self.depth -= 1;
        Ok(Ty::ObjectPattern(fields?))
    }

    fn parse_fields(&mut self) -> Result<Vec<Field>> {
        let mut fields: Vec<Field> = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            let at = self.at();
            let Some(name) = self.word() else {
                return Err(self.unexpected("property name or `}`"));
            };
            self.bump()?;
            if fields.iter().any(|f| f.name == name) {
                return Err(ParseError::DuplicateProperty { name, at }.into());
            }
            let ty = if self.peek() == Some(&Token::Colon) {
                self.bump()?;
                Some(self.parse_type_expression()?)
            } else {
                None
            };
            fields.push(Field { name, ty });
        }
        if fields.is_empty() {
            return Err(self.unexpected("property name"));
        }
        self.bump()?; // `}`
        Ok(fields)
    }
}

// ------------------------------ Front API -------------------------------- //

/// Parse every `type Name = ...` declaration in `source`, in order.
pub fn parse_definitions(source: &str) -> Result<Vec<(String, Ty)>> {
    Parser::new(source)?.parse_definitions()
}

/// Parse a lone type expression, e.g. `{ cx: number cy: number }`.
pub fn parse_type(source: &str) -> Result<Ty> {
    let mut parser = Parser::new(source)?;
    let ty = parser.parse_type_expression()?;
    if !parser.is_at_end() {
        return Err(parser.unexpected("end of input"));
    }
    Ok(ty)
}
