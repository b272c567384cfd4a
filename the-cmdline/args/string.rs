use crate::{
  args::{
    Hint,
    Rejection,
    Token,
    consume_token,
    invalid_value,
    token,
  },
  error::ArgStringError,
  value::Value,
};

/// Free text: a bare word, or a quoted string that may contain spaces.
///
/// Quoted strings understand the escapes `\\ \' \" \a \b \f \n \r \t \v`.
/// Any other backslash is kept as written. Bare words are taken verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Str {
  pub(crate) label:   String,
  pub(crate) name:    String,
  pub(crate) default: Value,
}

/// A quoted string scanned from the command line.
struct Quoted {
  delim:      char,
  value:      String,
  /// Offset after the closing quote, or the end of the line.
  end:        usize,
  terminated: bool,
  /// The line ended right after a backslash.
  in_escape:  bool,
}

fn scan_quoted(text: &str, index: usize, delim: char) -> Quoted {
  let start = index + delim.len_utf8();
  let mut value = String::new();
  let mut escaped = false;
  for (offset, ch) in text[start..].char_indices() {
    if escaped {
      escaped = false;
      match unescape(ch) {
        Some(ch) => value.push(ch),
        None => {
          value.push('\\');
          value.push(ch);
        },
      }
      continue;
    }
    if ch == delim {
      return Quoted {
        delim,
        value,
        end: start + offset + ch.len_utf8(),
        terminated: true,
        in_escape: false,
      };
    }
    if ch == '\\' {
      escaped = true;
    } else {
      value.push(ch);
    }
  }
  Quoted {
    delim,
    value,
    end: text.len(),
    terminated: false,
    in_escape: escaped,
  }
}

fn unescape(ch: char) -> Option<char> {
  match ch {
    '\\' | '\'' | '"' => Some(ch),
    'a' => Some('\x07'),
    'b' => Some('\x08'),
    'f' => Some('\x0c'),
    'n' => Some('\n'),
    'r' => Some('\r'),
    't' => Some('\t'),
    'v' => Some('\x0b'),
    _ => None,
  }
}

fn quote_char(text: &str, index: usize) -> Option<char> {
  text
    .get(index..)
    .and_then(|rest| rest.chars().next())
    .filter(|ch| matches!(ch, '"' | '\''))
}

/// Renders `value` so that it parses back unchanged.
pub(crate) fn quote(value: &str) -> String {
  let bare = !value.is_empty() && !value.contains(' ') && quote_char(value, 0).is_none();
  if bare {
    return value.to_string();
  }
  let delim = if !value.contains('"') || value.contains('\'') {
    '"'
  } else {
    '\''
  };
  let mut out = String::with_capacity(value.len() + 2);
  out.push(delim);
  for ch in value.chars() {
    match ch {
      '\\' => out.push_str("\\\\"),
      '\x07' => out.push_str("\\a"),
      '\x08' => out.push_str("\\b"),
      '\x0c' => out.push_str("\\f"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      '\x0b' => out.push_str("\\v"),
      ch if ch == delim => {
        out.push('\\');
        out.push(ch);
      },
      ch => out.push(ch),
    }
  }
  out.push(delim);
  out
}

impl Str {
  pub fn new(name: &str) -> Self {
    Self {
      label:   name.to_string(),
      name:    name.replace('-', "_"),
      default: Value::None,
    }
  }

  pub fn default(mut self, value: &str) -> Self {
    self.default = Value::from(value);
    self
  }

  pub(crate) fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), Rejection> {
    let Some(delim) = quote_char(text, index) else {
      return consume_token(text, index, &self.default, |word| Ok(Value::from(word)));
    };
    let quoted = scan_quoted(text, index, delim);
    if !quoted.terminated {
      return Err(Rejection::token(
        format!("unterminated string: {}", &text[index..]),
        index,
        text.len(),
      ));
    }
    let end = if text[quoted.end..].starts_with(' ') {
      quoted.end + 1
    } else {
      quoted.end
    };
    Ok((Value::Str(quoted.value), end))
  }

  fn hint<T>(&self, text: &str, index: usize, active: impl FnOnce(Option<char>) -> T) -> Hint<T> {
    if let Some(delim) = quote_char(text, index) {
      let quoted = scan_quoted(text, index, delim);
      if !quoted.terminated {
        let ghost = (!quoted.in_escape).then_some(quoted.delim);
        return Hint::Active(active(ghost));
      }
      return match text[quoted.end..].chars().next() {
        Some(' ') => Hint::Consumed(quoted.end + 1),
        Some(_) => Hint::Consumed(quoted.end),
        None => Hint::Active(active(None)),
      };
    }
    match token(text, index) {
      Token::End => Hint::Active(active(None)),
      Token::Skip => Hint::Consumed(index + 1),
      Token::Word {
        end,
        complete: true,
        ..
      } => Hint::Consumed(end),
      Token::Word { .. } => Hint::Active(active(None)),
    }
  }

  pub(crate) fn placeholder(&self, text: &str, index: usize) -> Hint<String> {
    if index >= text.len() {
      return Hint::Active(self.default_placeholder());
    }
    self.hint(text, index, |ghost| ghost.map(String::from).unwrap_or_default())
  }

  pub(crate) fn completions(&self, text: &str, index: usize) -> Hint<Vec<String>> {
    self.hint(text, index, |_| Vec::new())
  }

  pub(crate) fn default_placeholder(&self) -> String {
    self.label.clone()
  }

  pub(crate) fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    if *value == self.default {
      return Ok(String::new());
    }
    match value {
      Value::Str(value) => Ok(quote(value)),
      Value::None => Ok(String::new()),
      _ => Err(invalid_value(&self.name, value)),
    }
  }
}
