use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    /// Set opener `#{`
    ///
    /// Closed by an ordinary [`Token::RBrace`].
    SetOpen,

    /// Discard marker `#_`
    ///
    /// The next form is read and thrown away.
    ///
    /// # Examples
    /// ```text
    /// [1 #_2 3]     ; reads as [1 3]
    /// ```
    Discard,

    /// Anonymous function opener `#(`
    ///
    /// Closed by an ordinary [`Token::RParen`].
    ///
    /// # Examples
    /// ```text
    /// #(first %)
    /// ```
    AnonFnOpen,

    /// Regex literal body, backslashes kept as written
    ///
    /// # Examples
    /// ```text
    /// #"\d+"       ; Regex("\d+")
    /// ```
    Regex(String),

    /// Tagged literal prefix, stored without the `#`
    ///
    /// # Examples
    /// ```text
    /// #inst "2024-01-01T00:00:00Z"
    /// #uuid "f81d4fae-7dec-11d0-a765-00a0c91e6bf6"
    /// ```
    Tag(String),

    // Literals
    /// String literal enclosed in double quotes
    String(String),

    /// Character literal
    ///
    /// # Examples
    /// ```text
    /// \a
    /// \newline
    /// é
    /// ```
    Char(char),

    /// Integer, with an optional sign and `N` suffix
    Integer(i64),

    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// -1e3
    /// ```
    Float(f64),

    /// Exact decimal, written with an `M` suffix (`1.50M`)
    Decimal(Decimal),

    /// `nil`
    Nil,

    /// `true` / `false`
    Boolean(bool),

    // Names
    /// Symbol: `first`, `?b`, `*`, `clojure.string/join`
    Symbol(String),

    /// Keyword without its leading colon: `:block/refs` → `Keyword("block/refs")`
    Keyword(String),

    /// End of input
    Eof,
}

impl Token {
    /// Short description used in parser error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::SetOpen => "'#{'".to_string(),
            Token::Discard => "'#_'".to_string(),
            Token::AnonFnOpen => "'#('".to_string(),
            Token::Regex(pattern) => format!("regex #\"{}\"", pattern),
            Token::Tag(tag) => format!("tag #{}", tag),
            Token::String(s) => format!("string {:?}", s),
            Token::Char(c) => format!("character {:?}", c),
            Token::Integer(n) => format!("integer {}", n),
            Token::Float(n) => format!("float {}", n),
            Token::Decimal(d) => format!("decimal {}M", d),
            Token::Nil => "nil".to_string(),
            Token::Boolean(b) => b.to_string(),
            Token::Symbol(s) => format!("symbol {}", s),
            Token::Keyword(k) => format!("keyword :{}", k),
            Token::Eof => "end of input".to_string(),
        }
    }
}
