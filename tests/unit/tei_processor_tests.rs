/*!
 * Unit tests for TEI reading and segmentation.
 */

use std::path::Path;

use yattai::errors::DocumentError;
use yattai::tei_processor::{TeiDocument, normalize_whitespace};

use crate::common::SAMPLE_TEI;

fn extract(content: &str) -> Result<TeiDocument, DocumentError> {
    TeiDocument::from_content(content, Path::new("test.xml"))
}

#[test]
fn test_extract_sampleDocument_shouldFindBodySegmentsInOrder() {
    let doc = extract(SAMPLE_TEI).unwrap();

    let texts: Vec<&str> = doc.segments.iter().map(|s| s.source_text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "序分",
            "如是我聞。一時佛在舍衛國。",
            "祇樹給孤獨園。 與大比丘眾千二百五十人俱。",
        ]
    );

    let indices: Vec<usize> = doc.segments.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(doc.segments.len(), doc.segment_nodes.len());
}

#[test]
fn test_extract_runTwice_shouldBeDeterministic() {
    let first = extract(SAMPLE_TEI).unwrap();
    let second = extract(SAMPLE_TEI).unwrap();
    assert_eq!(first.segments, second.segments);
}

#[test]
fn test_extract_headerContent_shouldNeverBecomeSegment() {
    let doc = extract(SAMPLE_TEI).unwrap();
    for segment in &doc.segments {
        assert!(
            !segment.source_text.contains("金剛般若波羅蜜經"),
            "header title leaked into segment {:?}",
            segment
        );
    }
}

#[test]
fn test_extract_deeplyNestedHeaderParagraph_shouldBeExcluded() {
    let content = r#"<TEI>
      <teiHeader><fileDesc><p>header paragraph</p></fileDesc></teiHeader>
      <text><body><p>body paragraph</p></body></text>
    </TEI>"#;

    let doc = extract(content).unwrap();
    assert_eq!(doc.segments.len(), 1);
    assert_eq!(doc.segments[0].source_text, "body paragraph");
}

#[test]
fn test_extract_excludedSubtree_shouldNotContaminateSegmentText() {
    let doc = extract(SAMPLE_TEI).unwrap();
    let with_note = &doc.segments[2];
    assert!(!with_note.source_text.contains("editorial remark"));
}

#[test]
fn test_extract_nestedTranslatableElement_shouldBeAbsorbedNotSegmented() {
    let content = r#"<TEI><text><body>
      <p>outer <seg>inner</seg> tail</p>
    </body></text></TEI>"#;

    let doc = extract(content).unwrap();
    assert_eq!(doc.segments.len(), 1);
    assert_eq!(doc.segments[0].source_text, "outer inner tail");
}

#[test]
fn test_extract_translatableInsideExcludedSubtree_shouldNotBeSegmented() {
    let content = r#"<TEI><text><body>
      <ab><note><p>inside a note</p></note></ab>
      <l>流水不爭先</l>
    </body></text></TEI>"#;

    let doc = extract(content).unwrap();
    assert_eq!(doc.segments.len(), 1);
    assert_eq!(doc.segments[0].source_text, "流水不爭先");
}

#[test]
fn test_extract_outsideBody_shouldNotBeSegmented() {
    let content = r#"<TEI><text>
      <front><p>front matter</p></front>
      <body><p>body matter</p></body>
    </text></TEI>"#;

    let doc = extract(content).unwrap();
    assert_eq!(doc.segments.len(), 1);
    assert_eq!(doc.segments[0].source_text, "body matter");
}

#[test]
fn test_extract_idAttribute_shouldPreferXmlIdThenIdThenFallback() {
    let content = r#"<TEI><text><body>
      <p xml:id="alpha">one</p>
      <p id="beta">two</p>
      <p>three</p>
    </body></text></TEI>"#;

    let doc = extract(content).unwrap();
    let ids: Vec<&str> = doc.segments.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "beta", "seg-2"]);
}

#[test]
fn test_extract_namespacePrefixedTags_shouldMatchOnLocalName() {
    let content = r#"<tei:TEI xmlns:tei="http://www.tei-c.org/ns/1.0">
      <tei:text><tei:body><tei:p>prefixed paragraph</tei:p></tei:body></tei:text>
    </tei:TEI>"#;

    let doc = extract(content).unwrap();
    assert_eq!(doc.segments.len(), 1);
    assert_eq!(doc.segments[0].source_text, "prefixed paragraph");
}

#[test]
fn test_extract_emptyTranslatableElement_shouldBeDroppedSilently() {
    let content = r#"<TEI><text><body>
      <p>   </p>
      <p><note>skipped entirely</note></p>
      <p>kept</p>
    </body></text></TEI>"#;

    let doc = extract(content).unwrap();
    assert_eq!(doc.segments.len(), 1);
    assert_eq!(doc.segments[0].source_text, "kept");
    assert_eq!(doc.segments[0].index, 0);
}

#[test]
fn test_extract_noSegments_shouldFailWithNoTranslatableContent() {
    let content = "<TEI><text><body><lb/></body></text></TEI>";
    let err = extract(content).unwrap_err();
    assert!(matches!(err, DocumentError::NoTranslatableContent(_)));
}

#[test]
fn test_extract_malformedXml_shouldFailWithMalformed() {
    let err = extract("<TEI><text></TEI>").unwrap_err();
    assert!(matches!(err, DocumentError::Malformed { .. }));
}

#[test]
fn test_normalizeWhitespace_shouldCollapseRunsAndTrim() {
    assert_eq!(normalize_whitespace("  a\n\t b   c "), "a b c");
    assert_eq!(normalize_whitespace("\n \t"), "");
    assert_eq!(normalize_whitespace("unchanged"), "unchanged");
}
