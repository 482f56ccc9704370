//! # Structured Document Parser
//!
//! Reads Final Draft (`.fdx`) documents: an XML stream of
//! `<Paragraph Type="...">` elements whose text is split across one or more
//! `<Text>` runs. The XML layer only produces `(ParagraphKind, text)` pairs;
//! [`StructuredParser::parse_stream`] drives the scene/character state
//! machine over them.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::trace;

use crate::error::{Result, SluglineError};
use crate::identity::NameNormalizer;
use crate::pages::decode_text;
use crate::parser::builder::{ScriptBuilder, count_lines};
use crate::slug::SlugClassifier;
use crate::types::Script;

/// Paragraph types the parser acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParagraphKind {
    SceneHeading,
    Character,
    Dialogue,
    Action,
    /// Parenthetical, Transition, Shot, General, ...
    Other,
}

impl ParagraphKind {
    /// Maps a Final Draft `Type` attribute.
    #[must_use]
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "Scene Heading" => Self::SceneHeading,
            "Character" => Self::Character,
            "Dialogue" => Self::Dialogue,
            "Action" => Self::Action,
            _ => Self::Other,
        }
    }
}

/// A document flattened into its title and paragraph stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphStream {
    pub title: Option<String>,
    pub paragraphs: Vec<(ParagraphKind, String)>,
}

/// Parser for structured (tag-stream) screenplays.
pub struct StructuredParser {
    classifier: SlugClassifier,
    normalizer: NameNormalizer,
}

impl StructuredParser {
    /// # Errors
    ///
    /// Returns `SluglineError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            classifier: SlugClassifier::new()?,
            normalizer: NameNormalizer::new()?,
        })
    }

    /// Parses a raw `.fdx` document.
    ///
    /// # Errors
    ///
    /// Returns `SluglineError::MalformedInput` if the bytes are not
    /// well-formed XML. No partial script is produced.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Script> {
        let text = decode_text(bytes);
        let stream = read_paragraphs(&text)?;
        Ok(self.parse_stream(stream.title, stream.paragraphs))
    }

    /// Runs the scene/character state machine over an ordered paragraph
    /// stream.
    pub fn parse_stream<I, S>(&self, title: Option<String>, paragraphs: I) -> Script
    where
        I: IntoIterator<Item = (ParagraphKind, S)>,
        S: AsRef<str>,
    {
        let mut builder = ScriptBuilder::new(&self.classifier, &self.normalizer);

        for (kind, text) in paragraphs {
            let text = text.as_ref();
            trace!(?kind, text, "paragraph");
            match kind {
                ParagraphKind::SceneHeading => builder.open_scene(text),
                ParagraphKind::Character => {
                    builder.cue(text);
                }
                ParagraphKind::Dialogue => builder.dialogue(count_lines(text)),
                ParagraphKind::Action => builder.action(count_lines(text)),
                ParagraphKind::Other => {}
            }
        }

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        builder.finish(title, None)
    }
}

/// Flattens an FDX document into its title and paragraph stream.
///
/// # Errors
///
/// Returns `SluglineError::MalformedInput` for XML that is not well-formed:
/// reader errors, mismatched or unclosed tags, no root element, or text and
/// elements outside the single root element.
pub fn read_paragraphs(xml: &str) -> Result<ParagraphStream> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut stream = ParagraphStream::default();

    let mut depth = 0usize;
    let mut saw_root = false;
    let mut root_closed = false;

    // Open `<Paragraph>`: its kind and accumulated text.
    let mut paragraph: Option<(ParagraphKind, String)> = None;
    let mut in_text = false;

    let mut title_done = false;
    let mut title: Option<String> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            SluglineError::malformed(format!("{e} at byte {}", reader.error_position()))
        })?;

        match event {
            Event::Start(e) => {
                if root_closed {
                    return Err(SluglineError::malformed("element after the root element"));
                }
                depth += 1;
                saw_root = true;
                match e.name().as_ref() {
                    b"Paragraph" => {
                        let kind = match e.try_get_attribute("Type")? {
                            Some(attr) => ParagraphKind::from_type(&attr.unescape_value()?),
                            None => ParagraphKind::Other,
                        };
                        paragraph = Some((kind, String::new()));
                    }
                    b"Text" if paragraph.is_some() => in_text = true,
                    b"Title" if !title_done => title = Some(String::new()),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if root_closed {
                    return Err(SluglineError::malformed("element after the root element"));
                }
                // `<Root/>` opens and closes the document at once.
                root_closed |= depth == 0;
                saw_root = true;
                if e.name().as_ref() == b"Paragraph" {
                    let kind = match e.try_get_attribute("Type")? {
                        Some(attr) => ParagraphKind::from_type(&attr.unescape_value()?),
                        None => ParagraphKind::Other,
                    };
                    stream.paragraphs.push((kind, String::new()));
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err(SluglineError::malformed("text outside the root element"));
                }
                if in_text {
                    if let Some((_, body)) = paragraph.as_mut() {
                        body.push_str(&text);
                    }
                }
                if let Some(t) = title.as_mut().filter(|_| !title_done) {
                    t.push_str(&text);
                }
            }
            Event::CData(e) => {
                if depth == 0 {
                    return Err(SluglineError::malformed("CDATA outside the root element"));
                }
                if in_text {
                    if let Some((_, body)) = paragraph.as_mut() {
                        body.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
            }
            Event::End(e) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SluglineError::malformed("unexpected closing tag"))?;
                root_closed |= depth == 0;
                match e.name().as_ref() {
                    b"Paragraph" => {
                        if let Some(p) = paragraph.take() {
                            stream.paragraphs.push(p);
                        }
                        in_text = false;
                    }
                    b"Text" => in_text = false,
                    b"Title" if title.is_some() => title_done = true,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SluglineError::malformed("document has no root element"));
    }
    if depth != 0 {
        return Err(SluglineError::malformed(format!(
            "unexpected end of document with {depth} unclosed element(s)"
        )));
    }

    stream.title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>
<FinalDraft DocumentType="Script" Template="No" Version="4">
  <Content>
    <Paragraph Type="Action"><Text>Before any scene.</Text></Paragraph>
    <Paragraph Type="Scene Heading"><Text>INT. KITCHEN - DAY</Text></Paragraph>
    <Paragraph Type="Action"><Text>Anna cooks.</Text></Paragraph>
    <Paragraph Type="Character"><Text>Anna</Text></Paragraph>
    <Paragraph Type="Parenthetical"><Text>(quietly)</Text></Paragraph>
    <Paragraph Type="Dialogue"><Text>It's </Text><Text Style="Italic">ready</Text><Text>.</Text></Paragraph>
    <Paragraph Type="Character"><Text>BEN (O.S.)</Text></Paragraph>
    <Paragraph Type="Dialogue"><Text>Coming!</Text></Paragraph>
    <Paragraph Type="Transition"><Text>CUT TO:</Text></Paragraph>
    <Paragraph Type="Scene Heading"><Text>EXT. GARDEN - DUSK</Text></Paragraph>
    <Paragraph Type="Character"><Text>BEN</Text></Paragraph>
    <Paragraph Type="Dialogue"><Text>Smells good &amp; looks good.</Text></Paragraph>
    <Paragraph Type="Action"/>
  </Content>
  <TitlePage>
    <Content>
      <Paragraph Type="Text"><Text>ignored</Text></Paragraph>
    </Content>
  </TitlePage>
  <Title>  Dinner  </Title>
</FinalDraft>"#;

    fn parser() -> StructuredParser {
        StructuredParser::new().unwrap()
    }

    #[test]
    fn reads_paragraph_stream() {
        let stream = read_paragraphs(SAMPLE).unwrap();
        assert_eq!(stream.title.as_deref(), Some("Dinner"));
        assert_eq!(
            stream.paragraphs[1],
            (ParagraphKind::SceneHeading, "INT. KITCHEN - DAY".into())
        );
        assert_eq!(
            stream.paragraphs[5],
            (ParagraphKind::Dialogue, "It's ready.".into())
        );
        assert_eq!(stream.paragraphs[11].1, "Smells good & looks good.");
        assert_eq!(stream.paragraphs[12], (ParagraphKind::Action, String::new()));
    }

    #[test]
    fn parses_document() {
        let script = parser().parse_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(script.title.as_deref(), Some("Dinner"));
        assert_eq!(script.total_scenes, 2);
        assert_eq!(script.total_pages, None);

        let kitchen = &script.scenes[0];
        assert_eq!(kitchen.location, "KITCHEN");
        assert_eq!(kitchen.characters, vec!["ANNA", "BEN (O.S.)"]);
        assert_eq!(kitchen.line_count, 3);

        let ben = script.characters.get("BEN").unwrap();
        assert_eq!(ben.name_raw, "BEN (O.S.)");
        assert_eq!(ben.scenes, vec![1, 2]);
        assert_eq!(ben.total_lines, 2);
        assert_eq!(ben.dialogue_count, 2);
        assert_eq!(ben.first_appearance, 1);
        assert_eq!(ben.last_appearance, 2);

        assert!(script.validate().is_empty());
    }

    #[test]
    fn dialogue_block_counts_once() {
        let script = parser().parse_stream(
            None,
            [
                (ParagraphKind::SceneHeading, "INT. A - DAY"),
                (ParagraphKind::Character, "ANNA"),
                (ParagraphKind::Dialogue, "one\ntwo\n\nthree"),
                (ParagraphKind::Dialogue, "  "),
            ],
        );
        let anna = script.characters.get("ANNA").unwrap();
        assert_eq!(anna.total_lines, 3);
        assert_eq!(anna.dialogue_count, 2);
        assert_eq!(script.scenes[0].line_count, 3);
    }

    #[test]
    fn dialogue_without_speaker_is_ignored() {
        let script = parser().parse_stream(
            Some(String::new()),
            [
                (ParagraphKind::SceneHeading, "INT. A - DAY"),
                (ParagraphKind::Dialogue, "Who said that?"),
                (ParagraphKind::Action, "Silence.\nMore silence."),
            ],
        );
        assert_eq!(script.title, None);
        assert_eq!(script.scenes[0].line_count, 2);
        assert!(script.characters.is_empty());
    }

    #[test]
    fn production_marker_cue_is_rejected() {
        let script = parser().parse_stream(
            None,
            [
                (ParagraphKind::SceneHeading, "INT. A - DAY"),
                (ParagraphKind::Character, "FADE IN:"),
                (ParagraphKind::Dialogue, "not spoken"),
            ],
        );
        assert!(script.characters.is_empty());
        assert!(script.scenes[0].characters.is_empty());
        assert_eq!(script.scenes[0].line_count, 0);
    }

    #[test]
    fn variants_merge_under_first_seen_entry() {
        let script = parser().parse_stream(
            None,
            [
                (ParagraphKind::SceneHeading, "INT. A - DAY"),
                (ParagraphKind::Character, "JOHN (V.O.)"),
                (ParagraphKind::Dialogue, "Hello."),
                (ParagraphKind::SceneHeading, "INT. B - DAY"),
                (ParagraphKind::Character, "JOHN"),
                (ParagraphKind::Dialogue, "Hi.\nAgain."),
                (ParagraphKind::Character, "JOHN (CONT'D)"),
                (ParagraphKind::Dialogue, "Bye."),
            ],
        );
        assert_eq!(script.characters.len(), 1);
        let john = script.characters.get("JOHN").unwrap();
        assert_eq!(john.name_raw, "JOHN (V.O.)");
        assert_eq!(john.scenes, vec![1, 2]);
        assert_eq!(john.total_lines, 4);
        assert_eq!(john.dialogue_count, 3);
        assert_eq!(script.scenes[1].characters, vec!["JOHN", "JOHN (CONT'D)"]);
        assert!(script.validate().is_empty());
    }

    #[test]
    fn malformed_documents_fail() {
        let p = parser();
        for bad in [
            "",
            "   ",
            "<FinalDraft><Content><Paragraph Type=\"Action\">",
            "<FinalDraft></Content>",
            "<FinalDraft><Paragraph Type=\"Action\"><Text>x</Paragraph></FinalDraft>",
            "<FinalDraft></FinalDraft>trailing garbage",
            "garbage<FinalDraft></FinalDraft>",
            "<FinalDraft></FinalDraft><Second></Second>",
            "<FinalDraft/><Second/>",
            "<FinalDraft></FinalDraft><![CDATA[x]]>",
        ] {
            let err = p.parse_bytes(bad.as_bytes()).unwrap_err();
            assert!(
                matches!(err, SluglineError::MalformedInput { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn content_after_root_emits_nothing() {
        let doc = r#"<FinalDraft><Content>
    <Paragraph Type="Scene Heading"><Text>INT. A - DAY</Text></Paragraph>
  </Content></FinalDraft>
<Second><Paragraph Type="Scene Heading"><Text>INT. B - DAY</Text></Paragraph></Second>"#;
        let err = parser().parse_bytes(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, SluglineError::MalformedInput { .. }));
    }

    #[test]
    fn whitespace_and_comments_around_root_are_allowed() {
        let doc = "<?xml version=\"1.0\"?>\n<!-- draft -->\n<FinalDraft/>\n<!-- end -->\n";
        let stream = read_paragraphs(doc).unwrap();
        assert!(stream.paragraphs.is_empty());
    }

    #[test]
    fn windows_1252_input_decodes() {
        let mut doc =
            b"<FinalDraft><Content><Paragraph Type=\"Scene Heading\"><Text>INT. CAF".to_vec();
        doc.push(0xC9); // É in Windows-1252
        doc.extend_from_slice(b" - DAY</Text></Paragraph></Content></FinalDraft>");

        let script = parser().parse_bytes(&doc).unwrap();
        assert_eq!(script.scenes[0].location, "CAFÉ");
    }
}
