use color_eyre::eyre::{eyre, Result};
use log::warn;

use crate::tree::ServerRecord;

/// Token types for the stats document
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Opening tag `<name ...>`
    Open(String),
    /// Closing tag `</name>`
    Close(String),
    /// Self-closing tag `<name ... />`
    SelfClose(String),
    /// Character data between tags, entity references decoded
    Text(String),
    Eof,
}

/// Simple lexer for the subset of XML the stats endpoint emits
struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.position..]
            .iter()
            .zip(prefix.chars())
            .filter(|(a, b)| **a == *b)
            .count()
            == prefix.chars().count()
    }

    fn consume(&mut self, literal: &str) {
        for _ in literal.chars() {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            match self.current_char {
                None => return Ok(Token::Eof),
                Some('<') => {
                    if self.starts_with("<!--") {
                        self.skip_comment()?;
                        continue;
                    }
                    if self.starts_with("<![CDATA[") {
                        return self.read_cdata();
                    }
                    if self.starts_with("<!") {
                        // DOCTYPE and other markup declarations
                        self.skip_past('>')?;
                        continue;
                    }
                    if self.starts_with("<?") {
                        self.skip_processing_instruction()?;
                        continue;
                    }
                    if self.starts_with("</") {
                        return self.read_close_tag();
                    }
                    return self.read_open_tag();
                }
                Some(_) => return self.read_text(),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.consume("<!--");
        while self.current_char.is_some() {
            if self.starts_with("-->") {
                self.consume("-->");
                return Ok(());
            }
            self.advance();
        }
        Err(eyre!("Unterminated comment"))
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        self.consume("<?");
        while self.current_char.is_some() {
            if self.starts_with("?>") {
                self.consume("?>");
                return Ok(());
            }
            self.advance();
        }
        Err(eyre!("Unterminated processing instruction"))
    }

    fn skip_past(&mut self, terminator: char) -> Result<()> {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == terminator {
                return Ok(());
            }
        }
        Err(eyre!("Unterminated markup declaration"))
    }

    fn read_cdata(&mut self) -> Result<Token> {
        self.consume("<![CDATA[");
        let mut value = String::new();
        while let Some(ch) = self.current_char {
            if self.starts_with("]]>") {
                self.consume("]]>");
                return Ok(Token::Text(value));
            }
            value.push(ch);
            self.advance();
        }
        Err(eyre!("Unterminated CDATA section"))
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '.' || ch == ':' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn read_close_tag(&mut self) -> Result<Token> {
        self.consume("</");
        let name = self.read_name();
        if name.is_empty() {
            return Err(eyre!("Expected element name in closing tag"));
        }
        while let Some(ch) = self.current_char {
            if ch == '>' {
                self.advance();
                return Ok(Token::Close(name));
            }
            if !ch.is_whitespace() {
                return Err(eyre!("Unexpected character '{}' in closing tag </{}>", ch, name));
            }
            self.advance();
        }
        Err(eyre!("Unterminated closing tag </{}>", name))
    }

    fn read_open_tag(&mut self) -> Result<Token> {
        self.advance(); // Skip '<'
        let name = self.read_name();
        if name.is_empty() {
            return Err(eyre!("Expected element name after '<'"));
        }
        // Attributes are irrelevant to the stats document; lex past
        // them, honoring quoted values.
        loop {
            match self.current_char {
                None => return Err(eyre!("Unterminated tag <{}>", name)),
                Some('>') => {
                    self.advance();
                    return Ok(Token::Open(name));
                }
                Some('/') if self.starts_with("/>") => {
                    self.consume("/>");
                    return Ok(Token::SelfClose(name));
                }
                Some(quote @ ('"' | '\'')) => {
                    self.advance();
                    while let Some(ch) = self.current_char {
                        self.advance();
                        if ch == quote {
                            break;
                        }
                    }
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn read_text(&mut self) -> Result<Token> {
        let mut value = String::new();
        while let Some(ch) = self.current_char {
            if ch == '<' {
                break;
            }
            if ch == '&' {
                value.push_str(&self.read_entity());
            } else {
                value.push(ch);
                self.advance();
            }
        }
        Ok(Token::Text(value))
    }

    /// Decode an entity reference; unknown references stay literal
    fn read_entity(&mut self) -> String {
        self.advance(); // Skip '&'
        let mut name = String::new();
        while let Some(ch) = self.current_char {
            if ch == ';' {
                self.advance();
                return decode_entity(&name);
            }
            if ch == '<' || ch.is_whitespace() || name.len() > 8 {
                break;
            }
            name.push(ch);
            self.advance();
        }
        format!("&{name}")
    }
}

fn decode_entity(name: &str) -> String {
    match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()
            } else {
                None
            };
            match code.and_then(char::from_u32) {
                Some(ch) => ch.to_string(),
                None => format!("&{name};"),
            }
        }
    }
}

/// Parser for the stats document: walks to the `serverlist` element and
/// collects one record per `server` entry, tolerating unknown elements.
struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    fn new(mut lexer: Lexer) -> Result<Self> {
        let current_token = lexer.next_token()?;
        Ok(Self {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    /// Step over whitespace-only character data between elements
    fn skip_blank_text(&mut self) -> Result<()> {
        while let Token::Text(text) = &self.current_token {
            if !text.trim().is_empty() {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }

    fn parse_document(&mut self) -> Result<Vec<ServerRecord>> {
        self.skip_blank_text()?;
        let root = match &self.current_token {
            Token::Open(name) => name.clone(),
            Token::SelfClose(_) => return Ok(Vec::new()),
            other => return Err(eyre!("Expected root element, found {:?}", other)),
        };
        self.advance()?;

        let mut records = Vec::new();
        loop {
            self.skip_blank_text()?;
            match &self.current_token {
                Token::Open(name) if name == "serverlist" => {
                    self.advance()?;
                    records.extend(self.parse_serverlist()?);
                }
                Token::Open(name) => {
                    let name = name.clone();
                    self.advance()?;
                    self.skip_element(&name)?;
                }
                Token::SelfClose(_) | Token::Text(_) => self.advance()?,
                Token::Close(name) if *name == root => {
                    self.advance()?;
                    return Ok(records);
                }
                Token::Close(name) => {
                    return Err(eyre!("Mismatched closing tag </{}> in <{}>", name, root))
                }
                Token::Eof => return Err(eyre!("Unexpected end of document inside <{}>", root)),
            }
        }
    }

    fn parse_serverlist(&mut self) -> Result<Vec<ServerRecord>> {
        let mut records = Vec::new();
        loop {
            self.skip_blank_text()?;
            match &self.current_token {
                Token::Open(name) if name == "server" => {
                    self.advance()?;
                    let record = self.parse_server()?;
                    if record.name.is_empty() {
                        warn!("skipping server entry without a servername");
                    } else {
                        records.push(record);
                    }
                }
                Token::Open(name) => {
                    let name = name.clone();
                    self.advance()?;
                    self.skip_element(&name)?;
                }
                Token::SelfClose(_) | Token::Text(_) => self.advance()?,
                Token::Close(name) if name == "serverlist" => {
                    self.advance()?;
                    return Ok(records);
                }
                Token::Close(name) => {
                    return Err(eyre!("Mismatched closing tag </{}> in <serverlist>", name))
                }
                Token::Eof => return Err(eyre!("Unexpected end of document inside <serverlist>")),
            }
        }
    }

    fn parse_server(&mut self) -> Result<ServerRecord> {
        let mut record = ServerRecord::default();
        loop {
            self.skip_blank_text()?;
            match &self.current_token {
                Token::Open(field) => {
                    let field = field.clone();
                    self.advance()?;
                    match field.as_str() {
                        "servername" => record.name = self.read_text(&field)?,
                        "parentname" => record.parent_name = self.read_text(&field)?,
                        "lagmillisecs" => {
                            let value = self.read_text(&field)?;
                            record.lag = value
                                .parse()
                                .map_err(|_| eyre!("Invalid lagmillisecs: {}", value))?;
                        }
                        "usercount" => {
                            let value = self.read_text(&field)?;
                            record.users = value
                                .parse()
                                .map_err(|_| eyre!("Invalid usercount: {}", value))?;
                        }
                        "gecos" => record.description = self.read_text(&field)?,
                        _ => self.skip_element(&field)?,
                    }
                }
                Token::SelfClose(_) | Token::Text(_) => self.advance()?,
                Token::Close(name) if name == "server" => {
                    self.advance()?;
                    return Ok(record);
                }
                Token::Close(name) => {
                    return Err(eyre!("Mismatched closing tag </{}> in <server>", name))
                }
                Token::Eof => return Err(eyre!("Unexpected end of document inside <server>")),
            }
        }
    }

    /// Collect the character data of a scalar element up to its closing
    /// tag; surrounding whitespace is trimmed.
    fn read_text(&mut self, element: &str) -> Result<String> {
        let mut value = String::new();
        loop {
            match &self.current_token {
                Token::Text(text) => {
                    value.push_str(text);
                    self.advance()?;
                }
                Token::Close(name) if name == element => {
                    self.advance()?;
                    return Ok(value.trim().to_string());
                }
                other => return Err(eyre!("Unexpected {:?} inside <{}>", other, element)),
            }
        }
    }

    /// Skip a whole element subtree whose opening tag is already
    /// consumed, depth-counted so nested markup is irrelevant.
    fn skip_element(&mut self, name: &str) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            match &self.current_token {
                Token::Open(_) => depth += 1,
                Token::Close(_) => depth -= 1,
                Token::SelfClose(_) | Token::Text(_) => {}
                Token::Eof => return Err(eyre!("Unterminated element <{}>", name)),
            }
            self.advance()?;
        }
        Ok(())
    }
}

/// Decode a stats XML document into a flat server record list.
///
/// The record's derived fields (label, position, transit) are left at
/// their defaults; classification happens in the scrubber and transit in
/// the propagator.
pub fn parse_stats(input: &str) -> Result<Vec<ServerRecord>> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse_document()
}
