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

//! Plain text from Word documents.

use std::io::Cursor;
use std::io::Read;

use flipdeck_core::generate::GenerateError;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the text of a `.docx` file, one paragraph per line.
pub fn docx_to_text(bytes: &[u8]) -> Result<String, GenerateError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| GenerateError::Document(format!("not a Word document: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| GenerateError::Document(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| GenerateError::Document(format!("{DOCUMENT_PART}: {e}")))?;
    let text = document_text(&xml)?;
    if text.trim().is_empty() {
        return Err(GenerateError::Document(
            "the document contains no text".to_string(),
        ));
    }
    Ok(text)
}

fn document_text(xml: &str) -> Result<String, GenerateError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if local_name(e.name().as_ref()) == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    paragraph.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(c) = resolve_entity(&entity) {
                        paragraph.push(c);
                    }
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => {
                    let line = paragraph.trim_end();
                    if !line.is_empty() {
                        text.push_str(line);
                        text.push('\n');
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(GenerateError::Document(e.to_string())),
            _ => {}
        }
    }
    Ok(text)
}

fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => return Some('\''),
        "quot" => return Some('"'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "amp" => return Some('&'),
        _ => {}
    }
    let code = match entity.strip_prefix("#x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.strip_prefix('#')?.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}
