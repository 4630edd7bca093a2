// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::string::FromUtf8Error;

use crate::generate::GenerateError;
use crate::parser::ParseError;

/// The error type every boundary (CLI, WASM, store) reports with.
#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(msg: impl Into<String>) -> Self {
        ErrorReport {
            message: msg.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport {
            message: format!("I/O error: {value}"),
        }
    }
}

impl From<FromUtf8Error> for ErrorReport {
    fn from(value: FromUtf8Error) -> Self {
        ErrorReport {
            message: format!("UTF-8 conversion error: {value}"),
        }
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport {
            message: format!("JSON error: {value}"),
        }
    }
}

impl From<ParseError> for ErrorReport {
    fn from(value: ParseError) -> Self {
        ErrorReport {
            message: format!("Error parsing markdown deck: {value}"),
        }
    }
}

impl From<GenerateError> for ErrorReport {
    fn from(value: GenerateError) -> Self {
        ErrorReport {
            message: value.to_string(),
        }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(msg: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport {
        message: msg.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Side;

    #[test]
    fn test_parse_error_is_prefixed() {
        let report = ErrorReport::from(ParseError::EmptyQuestionOrAnswer {
            card: 2,
            side: Side::Answer,
            line: 7,
        });
        assert_eq!(
            report.to_string(),
            "error: Error parsing markdown deck: Empty answer at card 2 (line 7). Both question and answer must have content."
        );
    }

    #[test]
    fn test_fail() {
        let result: Fallible<()> = fail("nope");
        assert_eq!(result.unwrap_err().message(), "nope");
    }
}
