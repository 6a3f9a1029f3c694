//! Delimiter-separated list arguments.
//!
//! A [`Separator`] consumes arguments split by a single-character delimiter
//! and stops once no delimiter is left:
//!
//! ```
//! use starlight_commands::Separator;
//!
//! let parsed = Separator::<u32>::default().parse("1, 2, 3, 4, 5, 6 hello").unwrap();
//! assert_eq!(parsed.values, vec![1, 2, 3, 4, 5, 6]);
//! assert_eq!(parsed.remainder, "hello");
//! ```

use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

use tracing::trace;

use crate::error::{ConvertError, ConvertResult};

/// How the argument after the last delimiter is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeparatorMode {
    /// Take one word (or one quoted string) and leave the rest for the next
    /// parameter.
    #[default]
    Greedy,
    /// Take everything up to the end of the input.
    Rest,
}

/// The converted values plus whatever input was not consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparatorOutput<T> {
    pub values: Vec<T>,
    /// Unconsumed input, trimmed. Empty in [`SeparatorMode::Rest`].
    pub remainder: String,
}

/// Converts a delimiter-separated list into `Vec<T>`.
pub struct Separator<T> {
    delimiter: char,
    mode: SeparatorMode,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for Separator<T> {
    fn default() -> Self {
        Self {
            delimiter: ',',
            mode: SeparatorMode::default(),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Separator<T> {
    fn clone(&self) -> Self {
        Self {
            delimiter: self.delimiter,
            mode: self.mode,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Separator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Separator[{}, {:?}]",
            std::any::type_name::<T>(),
            self.delimiter
        )
    }
}

impl<T> Separator<T> {
    /// Creates a separator on `delimiter`.
    pub fn new(delimiter: char) -> ConvertResult<Self> {
        if delimiter.is_whitespace() {
            return Err(ConvertError::InvalidDelimiter(delimiter.to_string()));
        }
        Ok(Self {
            delimiter,
            ..Self::default()
        })
    }

    /// Creates a separator from a delimiter given as text, e.g. from config.
    ///
    /// Surrounding whitespace is ignored.
    pub fn parse_delimiter(delimiter: &str) -> ConvertResult<Self> {
        let mut chars = delimiter.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => Err(ConvertError::InvalidDelimiter(delimiter.to_string())),
        }
    }

    pub fn mode(mut self, mode: SeparatorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl<T> Separator<T>
where
    T: FromStr,
    T::Err: Display,
{
    /// Splits `input` on the delimiter and converts every argument.
    pub fn parse(&self, input: &str) -> ConvertResult<SeparatorOutput<T>> {
        let mut values = Vec::new();
        let mut rest = input;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                return Ok(SeparatorOutput {
                    values,
                    remainder: String::new(),
                });
            }

            let Some(pos) = rest.find(self.delimiter) else {
                let (argument, remainder) = match self.mode {
                    SeparatorMode::Rest => (rest.trim_end(), ""),
                    SeparatorMode::Greedy => split_word(rest)?,
                };
                values.push(convert(argument)?);
                trace!(count = values.len(), "Separated arguments converted");
                return Ok(SeparatorOutput {
                    values,
                    remainder: remainder.trim().to_string(),
                });
            };

            let argument = rest[..pos].trim_end();
            rest = &rest[pos + self.delimiter.len_utf8()..];
            if rest.is_empty() {
                return Err(ConvertError::ExpectedEndOfSeparator {
                    separator: self.delimiter,
                });
            }
            values.push(convert(argument)?);
        }
    }
}

fn convert<T>(argument: &str) -> ConvertResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    argument.parse().map_err(|e: T::Err| ConvertError::BadArgument {
        argument: argument.to_string(),
        reason: e.to_string(),
    })
}

/// Splits the first word off `input`, honouring double quotes.
fn split_word(input: &str) -> ConvertResult<(&str, &str)> {
    if let Some(quoted) = input.strip_prefix('"') {
        let end = quoted
            .find('"')
            .ok_or_else(|| ConvertError::ExpectedClosingQuote(input.to_string()))?;
        return Ok((&quoted[..end], &quoted[end + 1..]));
    }
    match input.find(char::is_whitespace) {
        Some(end) => Ok((&input[..end], &input[end..])),
        None => Ok((input, "")),
    }
}
