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
  value::{
    RegexFlags,
    RegexPattern,
    Value,
  },
};

/// Characters that begin an undelimited pattern. Any other non-space
/// character opens a delimited one.
const BARE_START: &str = r".^$*+?[]{}\()";

/// Delimiters tried, in order, when rendering a pattern.
const DELIMITERS: [char; 14] = ['/', ':', '"', '\'', '#', '|', '!', '%', ',', ';', '@', '~', '=', '&'];

fn is_bare_start(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_' || BARE_START.contains(ch)
}

/// The text reads back unchanged as an undelimited pattern.
fn is_bare_word(text: &str) -> bool {
  text.chars().next().is_some_and(is_bare_start) && !text.contains(' ')
}

/// A regular expression, optionally followed by replacement text.
///
/// Delimited form: `/pattern/flags` or, for replace arguments,
/// `/pattern/replacement/flags`. The delimiter is whatever character opens
/// the argument. A backslash keeps the next character from ending a segment
/// and is preserved in the value. A segment left open at the end of the line
/// is closed implicitly.
///
/// Bare form: a word starting with a letter, digit, underscore or regex
/// metacharacter is taken as the pattern up to the next space.
///
/// Rendering never escapes. It picks a delimiter absent from the text and
/// falls back to the bare form when no delimited form reads back the same.
#[derive(Debug, Clone, PartialEq)]
pub struct Regex {
  pub(crate) label:   String,
  pub(crate) name:    String,
  pub(crate) replace: bool,
  pub(crate) flags:   RegexFlags,
  pub(crate) default: Value,
}

struct Segment<'a> {
  text:       &'a str,
  /// Offset after the closing delimiter, or the end of the line.
  end:        usize,
  terminated: bool,
}

fn scan_segment(text: &str, start: usize, delim: char) -> Segment<'_> {
  let mut chars = text[start..].char_indices();
  while let Some((offset, ch)) = chars.next() {
    if ch == '\\' {
      chars.next();
      continue;
    }
    if ch == delim {
      return Segment {
        text:       &text[start..start + offset],
        end:        start + offset + ch.len_utf8(),
        terminated: true,
      };
    }
  }
  Segment {
    text:       &text[start..],
    end:        text.len(),
    terminated: false,
  }
}

struct FlagRun {
  flags:    RegexFlags,
  end:      usize,
  /// A space ended the flags.
  complete: bool,
}

struct Delimited<'a> {
  delim:       char,
  pattern:     Segment<'a>,
  replacement: Option<Segment<'a>>,
  flags:       Option<FlagRun>,
}

impl Delimited<'_> {
  fn end(&self) -> usize {
    match (&self.flags, &self.replacement) {
      (Some(run), _) => run.end,
      (None, Some(replacement)) => replacement.end,
      (None, None) => self.pattern.end,
    }
  }
}

fn count_unescaped(text: &str, delim: char) -> usize {
  let mut count = 0;
  let mut chars = text.chars();
  while let Some(ch) = chars.next() {
    if ch == '\\' {
      chars.next();
    } else if ch == delim {
      count += 1;
    }
  }
  count
}

/// The text ends with a backslash that escapes nothing.
fn ends_with_escape(text: &str) -> bool {
  let mut chars = text.chars();
  while let Some(ch) = chars.next() {
    if ch == '\\' && chars.next().is_none() {
      return true;
    }
  }
  false
}

/// The first delimiter that occurs unescaped in none of `parts`.
fn choose_delimiter(parts: &[&str]) -> Option<char> {
  DELIMITERS
    .into_iter()
    .find(|delim| parts.iter().all(|part| count_unescaped(part, *delim) == 0))
}

impl Regex {
  pub fn new(name: &str) -> Self {
    Self {
      label:   name.to_string(),
      name:    name.replace('-', "_"),
      replace: false,
      flags:   RegexFlags::default(),
      default: Value::None,
    }
  }

  /// A pattern followed by replacement text.
  pub fn replace(name: &str) -> Self {
    Self {
      replace: true,
      default: Value::Replace {
        pattern:     None,
        replacement: None,
      },
      ..Self::new(name)
    }
  }

  pub fn default(mut self, value: impl Into<Value>) -> Self {
    self.default = value.into();
    self
  }

  /// Flags every parsed pattern starts with, on top of the defaults.
  pub fn flags(mut self, flags: RegexFlags) -> Self {
    self.flags = RegexFlags::default() | flags;
    self
  }

  fn value(&self, pattern: RegexPattern, replacement: Option<String>) -> Value {
    if self.replace {
      Value::Replace {
        pattern: Some(pattern),
        replacement,
      }
    } else {
      Value::Regex(pattern)
    }
  }

  fn scan_flags(&self, text: &str, start: usize) -> Result<FlagRun, Rejection> {
    let mut flags = self.flags;
    for (offset, ch) in text[start..].char_indices() {
      if ch == ' ' {
        return Ok(FlagRun {
          flags,
          end: start + offset + 1,
          complete: true,
        });
      }
      match RegexFlags::from_char(ch) {
        Some(flag) => flags |= flag,
        None => {
          let at = start + offset;
          return Err(Rejection::token(format!("unknown flag: {ch}"), at, at));
        },
      }
    }
    Ok(FlagRun {
      flags,
      end: text.len(),
      complete: false,
    })
  }

  fn scan_delimited<'a>(&self, text: &'a str, index: usize, delim: char) -> Result<Delimited<'a>, Rejection> {
    let pattern = scan_segment(text, index + delim.len_utf8(), delim);
    if !pattern.terminated {
      return Ok(Delimited {
        delim,
        pattern,
        replacement: None,
        flags: None,
      });
    }
    let replacement = self
      .replace
      .then(|| scan_segment(text, pattern.end, delim));
    let flags_start = match &replacement {
      Some(segment) if !segment.terminated => None,
      Some(segment) => Some(segment.end),
      None => Some(pattern.end),
    };
    let Some(flags_start) = flags_start else {
      return Ok(Delimited {
        delim,
        pattern,
        replacement,
        flags: None,
      });
    };
    let flags = self.scan_flags(text, flags_start)?;
    Ok(Delimited {
      delim,
      pattern,
      replacement,
      flags: Some(flags),
    })
  }

  pub(crate) fn consume(&self, text: &str, index: usize) -> Result<(Value, usize), Rejection> {
    let first = text.get(index..).and_then(|rest| rest.chars().next());
    let delim = match first {
      Some(ch) if ch != ' ' && !is_bare_start(ch) => ch,
      _ => {
        return consume_token(text, index, &self.default, |word| {
          let pattern = RegexPattern {
            pattern: word.to_string(),
            flags:   self.flags,
          };
          Ok(self.value(pattern, None))
        });
      },
    };
    let scan = self.scan_delimited(text, index, delim)?;
    let pattern = RegexPattern {
      pattern: scan.pattern.text.to_string(),
      flags:   scan.flags.as_ref().map_or(self.flags, |run| run.flags),
    };
    let replacement = scan
      .replacement
      .as_ref()
      .map(|segment| segment.text.to_string());
    Ok((self.value(pattern, replacement), scan.end()))
  }

  /// Placeholder fragment for the delimiters still missing at the end of
  /// the line, or where the argument ends.
  fn scan_hint(&self, text: &str, index: usize) -> Hint<String> {
    let first = text.get(index..).and_then(|rest| rest.chars().next());
    let delim = match first {
      None => return Hint::Active(self.default_placeholder()),
      Some(ch) if ch != ' ' && !is_bare_start(ch) => ch,
      Some(_) => {
        return match token(text, index) {
          Token::Skip => Hint::Consumed(index + 1),
          Token::Word {
            end,
            complete: true,
            ..
          } => Hint::Consumed(end),
          _ => Hint::Active(String::new()),
        };
      },
    };
    let Ok(scan) = self.scan_delimited(text, index, delim) else {
      return Hint::Invalid;
    };
    if !scan.pattern.terminated {
      let closing = if self.replace {
        format!("{delim}{delim}")
      } else {
        delim.to_string()
      };
      return Hint::Active(closing);
    }
    if scan.replacement.as_ref().is_some_and(|segment| !segment.terminated) {
      return Hint::Active(scan.delim.to_string());
    }
    match scan.flags {
      Some(run) if run.complete => Hint::Consumed(run.end),
      _ => Hint::Active(String::new()),
    }
  }

  pub(crate) fn placeholder(&self, text: &str, index: usize) -> Hint<String> {
    self.scan_hint(text, index)
  }

  pub(crate) fn completions(&self, text: &str, index: usize) -> Hint<Vec<String>> {
    self.scan_hint(text, index).map(|_| Vec::new())
  }

  pub(crate) fn default_placeholder(&self) -> String {
    self.label.clone()
  }

  pub(crate) fn arg_string(&self, value: &Value) -> Result<String, ArgStringError> {
    self.fragment(value, true)
  }

  /// Renders `value` as part of a longer line. `last` is false when more
  /// text follows, which rules out forms closed only by the end of the line.
  pub(crate) fn fragment(&self, value: &Value, last: bool) -> Result<String, ArgStringError> {
    if *value == self.default {
      return Ok(String::new());
    }
    let rendered = match value {
      Value::None => Some(String::new()),
      Value::Regex(pattern) if !self.replace => self.render(pattern, None, last),
      Value::Replace {
        pattern: None,
        replacement: None,
      } if self.replace => Some(String::new()),
      Value::Replace {
        pattern: Some(pattern),
        replacement,
      } if self.replace => self.render(pattern, replacement.as_deref(), last),
      _ => None,
    };
    rendered.ok_or_else(|| invalid_value(&self.name, value))
  }

  /// Renders a pattern, or `None` when no rendering parses back to the
  /// same value.
  fn render(&self, pattern: &RegexPattern, replacement: Option<&str>, last: bool) -> Option<String> {
    if !pattern.flags.contains(self.flags) {
      return None;
    }
    let letters = pattern.flags.letters_beyond(self.flags);
    let mut parts = vec![pattern.pattern.as_str()];
    parts.extend(replacement);
    let delim = choose_delimiter(&parts);
    let closes = !ends_with_escape(&pattern.pattern) && (replacement.is_some() || !self.replace);

    let bare = letters.is_empty() && replacement.is_none() && is_bare_word(&pattern.pattern);
    if bare && (!closes || delim.is_none()) {
      return Some(pattern.pattern.clone());
    }
    let delim = delim?;
    let mut out = format!("{delim}{}", pattern.pattern);
    if !closes {
      // Only the end of the line closes the pattern.
      return (letters.is_empty() && replacement.is_none() && last).then_some(out);
    }
    out.push(delim);
    if let Some(replacement) = replacement {
      out.push_str(replacement);
      if ends_with_escape(replacement) {
        return (letters.is_empty() && last).then_some(out);
      }
      out.push(delim);
    }
    out.push_str(&letters);
    Some(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::args::testing::*;

  fn re(pattern: &str) -> RegexPattern {
    RegexPattern::new(pattern)
  }

  fn re_i(pattern: &str) -> RegexPattern {
    RegexPattern::new(pattern).with_flags(RegexFlags::IGNORE_CASE)
  }

  fn repl(pattern: &str, replacement: Option<&str>) -> Value {
    Value::Replace {
      pattern:     Some(re(pattern)),
      replacement: replacement.map(str::to_string),
    }
  }

  #[test]
  fn consume_delimited() {
    let arg = Regex::new("regex");
    assert_consume(arg.clone(), "", 0, Value::None, 0);
    assert_consume(arg.clone(), " ", 0, Value::None, 1);
    assert_consume(arg.clone(), "/abc/", 0, re("abc"), 5);
    assert_consume(arg.clone(), "/abc/ def", 0, re("abc"), 6);
    assert_consume(arg.clone(), "/abc/  def", 0, re("abc"), 6);
    assert_consume(arg.clone(), "/abc/i def", 0, re_i("abc"), 7);
    assert_consume(arg.clone(), "/abc/IS", 0, re_i("abc").with_flags(RegexFlags::DOT_ALL), 7);
    assert_consume(arg.clone(), ":abc:", 0, re("abc"), 5);
    assert_consume(arg.clone(), "\"a b\"", 0, re("a b"), 5);
    assert_consume(arg.clone(), r"/a\/b/", 0, re(r"a\/b"), 6);
    assert_consume(arg.clone(), "/abc", 0, re("abc"), 4);
    assert_consume(arg.clone(), "/abc ", 0, re("abc "), 5);
    assert_consume(arg.clone(), "/(", 0, re("("), 2);
    assert_consume(arg.clone(), "//", 0, re(""), 2);
  }

  #[test]
  fn consume_bare() {
    let arg = Regex::new("regex");
    assert_consume(arg.clone(), "abc", 0, re("abc"), 3);
    assert_consume(arg.clone(), "abc def", 0, re("abc"), 4);
    assert_consume(arg.clone(), r"\d+ x", 0, re(r"\d+"), 4);
    assert_consume(arg.clone(), "(a|b)", 0, re("(a|b)"), 5);
  }

  #[test]
  fn rejects_unknown_flags() {
    assert_rejects(Regex::new("regex"), "/abc/X def", 0, "unknown flag: X", 5, 5);
    assert_rejects(Regex::replace("regex"), "/abc/def/y  def", 0, "unknown flag: y", 9, 9);
  }

  #[test]
  fn consume_replace() {
    let arg = Regex::replace("regex");
    let empty = Value::Replace {
      pattern:     None,
      replacement: None,
    };
    assert_consume(arg.clone(), "", 0, empty.clone(), 0);
    assert_consume(arg.clone(), " ", 0, empty, 1);
    assert_consume(arg.clone(), "/abc", 0, repl("abc", None), 4);
    assert_consume(arg.clone(), "/abc ", 0, repl("abc ", None), 5);
    assert_consume(arg.clone(), "\"abc\"", 0, repl("abc", Some("")), 5);
    assert_consume(arg.clone(), "\"abc\"\"", 0, repl("abc", Some("")), 6);
    assert_consume(arg.clone(), "/abc/def", 0, repl("abc", Some("def")), 8);
    assert_consume(arg.clone(), "/abc/def/ def", 0, repl("abc", Some("def")), 10);
    assert_consume(
      arg.clone(),
      "/abc/def/i  def",
      0,
      Value::Replace {
        pattern:     Some(re_i("abc")),
        replacement: Some("def".to_string()),
      },
      11,
    );
    assert_consume(arg.clone(), "/(", 0, repl("(", None), 2);
    assert_consume(arg.clone(), "abc x", 0, repl("abc", None), 4);
  }

  #[test]
  fn placeholder() {
    let arg = Regex::new("regex");
    assert_placeholder(arg.clone(), "", 0, Hint::Active("regex"));
    assert_placeholder(arg.clone(), "/", 0, Hint::Active("/"));
    assert_placeholder(arg.clone(), "/abc", 0, Hint::Active("/"));
    assert_placeholder(arg.clone(), "//", 0, Hint::Active(""));
    assert_placeholder(arg.clone(), "//i", 0, Hint::Active(""));
    assert_placeholder(arg.clone(), "// ", 0, Hint::Consumed(3));
    assert_placeholder(arg.clone(), "//x", 0, Hint::Invalid);
    assert_placeholder(arg.clone(), "abc", 0, Hint::Active(""));
    assert_placeholder(arg.clone(), "abc ", 0, Hint::Consumed(4));

    let arg = Regex::replace("regex");
    assert_placeholder(arg.clone(), "/", 0, Hint::Active("//"));
    assert_placeholder(arg.clone(), "/x/", 0, Hint::Active("/"));
    assert_placeholder(arg.clone(), r"/\//", 0, Hint::Active("/"));
    assert_placeholder(arg.clone(), "/x//", 0, Hint::Active(""));
    assert_placeholder(arg.clone(), "/x// ", 0, Hint::Consumed(5));
  }

  #[test]
  fn completions() {
    assert_completions(Regex::new("regex"), "/abc", 0, Hint::Active(vec![]));
    assert_completions(Regex::new("regex"), "/abc/ ", 0, Hint::Consumed(6));
    assert_completions(Regex::new("regex"), "/abc/q", 0, Hint::Invalid);
  }

  #[test]
  fn arg_string() {
    let arg = Regex::new("regex");
    assert_arg_string(arg.clone(), Value::None, "");
    assert_arg_string(arg.clone(), re("str"), "/str/");
    assert_arg_string(arg.clone(), re(""), "//");
    assert_arg_string(arg.clone(), re_i("str"), "/str/i");
    assert_arg_string(arg.clone(), re("/usr/bin"), ":/usr/bin:");
    assert_arg_string(arg.clone(), re("/usr/bin:"), "\"/usr/bin:\"");
    assert_arg_string(arg.clone(), re(r"//''\:"), r"://''\::");
    assert_arg_string(arg.clone(), re(r"a\"), r"a\");
    assert_arg_string(arg.clone(), re(r"a b\"), r"/a b\");
    assert_invalid_value(arg.clone(), re_i(r"a\"));
    assert_invalid_value(arg.clone(), "str");
    assert_invalid_value(arg, repl("str", Some("abc")));
  }

  #[test]
  fn arg_string_falls_back_to_unused_delimiter() {
    let arg = Regex::new("regex");
    assert_arg_string(arg.clone(), re(r#"x/:"'"#), r##"#x/:"'#"##);
    assert_arg_string(arg.clone(), re(r#"///'"':\\:"'""#), r##"#///'"':\\:"'"#"##);
    assert_arg_string(arg.clone(), re(r#"x/:"'#|!%,;@~=&"#), r#"x/:"'#|!%,;@~=&"#);
    assert_invalid_value(arg, re(r#"x /:"'#|!%,;@~=&"#));
  }

  #[test]
  fn flags_add_to_defaults() {
    let arg = Regex::new("regex").flags(RegexFlags::IGNORE_CASE);
    assert_consume(arg.clone(), "/a/", 0, re_i("a"), 3);
    assert_consume(arg.clone(), "a", 0, re_i("a"), 1);
    assert_arg_string(arg.clone(), re_i("a"), "/a/");
    assert_invalid_value(arg, re("a"));
  }

  #[test]
  fn arg_string_replace() {
    let arg = Regex::replace("regex");
    assert_arg_string(
      arg.clone(),
      Value::Replace {
        pattern:     None,
        replacement: None,
      },
      "",
    );
    assert_arg_string(arg.clone(), repl("str", Some("abc")), "/str/abc/");
    assert_arg_string(arg.clone(), repl("str", None), "str");
    assert_arg_string(arg.clone(), repl(r"a\", None), r"a\");
    assert_arg_string(arg.clone(), repl("x y", None), "/x y");
    assert_arg_string(arg.clone(), repl("a/b", Some("c")), ":a/b:c:");
    assert_arg_string(
      arg.clone(),
      Value::Replace {
        pattern:     Some(re_i("str")),
        replacement: Some("abc".to_string()),
      },
      "/str/abc/i",
    );
    assert_arg_string(arg.clone(), repl("str", Some(r"x\")), r"/str/x\");
    assert_invalid_value(arg.clone(), re("str"));
    assert_invalid_value(
      arg,
      Value::Replace {
        pattern:     Some(re_i("str")),
        replacement: None,
      },
    );
  }

  #[test]
  fn arg_string_parses_back() {
    let arg = crate::args::Arg::from(Regex::replace("regex"));
    for value in [
      repl("str", Some("abc")),
      repl("a/b:c", Some("d\"e")),
      repl("", Some("")),
      repl("x y", None),
      repl("abc", None),
      repl(r#"x/:"'"#, Some("y")),
    ] {
      let text = arg.arg_string(&value).unwrap();
      assert_eq!(arg.consume(&text, 0), Ok((value, text.len())), "{text}");
    }
  }

  #[test]
  fn open_forms_only_end_the_line() {
    let arg = Regex::replace("regex");
    let open = repl("x y", None);
    assert_eq!(arg.fragment(&open, true), Ok("/x y".to_string()));
    assert_eq!(arg.fragment(&open, false), Err(invalid_value("regex", &open)));
    assert_eq!(arg.fragment(&repl("abc", None), false), Ok("abc".to_string()));
    assert_eq!(arg.fragment(&repl("abc", Some("d")), false), Ok("/abc/d/".to_string()));

    let trailing = repl("str", Some(r"x\"));
    assert_eq!(arg.fragment(&trailing, false), Err(invalid_value("regex", &trailing)));

    let arg = Regex::new("regex");
    assert_eq!(arg.fragment(&re(r"a\").into(), false), Ok(r"a\".to_string()));
    let spaced = Value::from(re(r"a b\"));
    assert_eq!(arg.fragment(&spaced, false), Err(invalid_value("regex", &spaced)));
  }
}
