/*!
 * End-to-end tests for the batch translation workflow, driven through the
 * controller with a scripted engine.
 */

use std::fs;

use yattai::app_config::Config;
use yattai::app_controller::Controller;
use yattai::providers::mock::MockTranslator;
use yattai::tei_writer::is_translation_note;
use yattai::xml_tree::XmlTree;

use crate::common::{SAMPLE_TEI, create_temp_dir, create_test_file, create_test_tei};

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.processing.show_progress = false;
    config
}

fn count_notes_in_file(path: &std::path::Path) -> usize {
    let tree = XmlTree::parse_file(path).unwrap();
    let root = tree.root_element().unwrap();
    tree.descendants(root)
        .filter(|n| is_translation_note(&tree, *n))
        .count()
}

#[test]
fn test_workflow_directoryBatch_shouldTranslateAndMirrorTree() {
    let workspace = create_temp_dir().unwrap();
    let input_dir = workspace.path().join("corpus");
    let output_dir = workspace.path().join("translated");
    fs::create_dir_all(input_dir.join("sub")).unwrap();

    create_test_tei(&input_dir, "a.xml").unwrap();
    create_test_tei(&input_dir.join("sub"), "b.xml").unwrap();

    let controller = Controller::with_config(quiet_config()).unwrap();
    let translator = MockTranslator::working();
    let summary = controller
        .run_with_translator(&input_dir, &output_dir, &translator)
        .unwrap();

    assert_eq!(summary.files, 2);
    assert_eq!(summary.ok, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total_segments, 6);

    let out_a = output_dir.join("a.xml");
    let out_b = output_dir.join("sub").join("b.xml");
    assert!(out_a.exists());
    assert!(out_b.exists(), "output tree must mirror the input tree");
    assert_eq!(count_notes_in_file(&out_a), 3);
    assert_eq!(count_notes_in_file(&out_b), 3);
    assert!(fs::read_to_string(&out_a).unwrap().contains("[en] 如是我聞。一時佛在舍衛國。"));
}

#[test]
fn test_workflow_secondRun_shouldResumeWithoutRewriting() {
    let workspace = create_temp_dir().unwrap();
    let input_dir = workspace.path().join("corpus");
    let output_dir = workspace.path().join("translated");
    fs::create_dir_all(&input_dir).unwrap();
    create_test_tei(&input_dir, "a.xml").unwrap();

    let controller = Controller::with_config(quiet_config()).unwrap();

    let first_engine = MockTranslator::working();
    let first = controller
        .run_with_translator(&input_dir, &output_dir, &first_engine)
        .unwrap();
    assert_eq!(first.ok, 1);
    let first_output = fs::read_to_string(output_dir.join("a.xml")).unwrap();
    let first_calls = first_engine.calls();
    assert_eq!(first_calls, 3);

    let second_engine = MockTranslator::working();
    let second = controller
        .run_with_translator(&input_dir, &output_dir, &second_engine)
        .unwrap();
    assert_eq!(second.ok, 1);
    assert_eq!(second.failed, 0);
    assert_eq!(second_engine.calls(), 0, "resume must not re-translate a complete file");

    let second_output = fs::read_to_string(output_dir.join("a.xml")).unwrap();
    assert_eq!(first_output, second_output);
}

#[test]
fn test_workflow_resumeDisabled_shouldReprocess() {
    let workspace = create_temp_dir().unwrap();
    let input_dir = workspace.path().join("corpus");
    let output_dir = workspace.path().join("translated");
    fs::create_dir_all(&input_dir).unwrap();
    create_test_tei(&input_dir, "a.xml").unwrap();

    let mut config = quiet_config();
    config.processing.resume = false;
    let controller = Controller::with_config(config).unwrap();

    let translator = MockTranslator::working();
    controller
        .run_with_translator(&input_dir, &output_dir, &translator)
        .unwrap();
    controller
        .run_with_translator(&input_dir, &output_dir, &translator)
        .unwrap();

    assert_eq!(translator.calls(), 6, "both runs must translate all segments");
    // Non-overwrite annotation keeps a single note per segment even so.
    assert_eq!(count_notes_in_file(&output_dir.join("a.xml")), 3);
}

#[test]
fn test_workflow_singleFileToExactOutputPath() {
    let workspace = create_temp_dir().unwrap();
    let input = create_test_tei(workspace.path(), "sutra.xml").unwrap();
    let output = workspace.path().join("exact").join("result.xml");

    let mut config = quiet_config();
    config.processing.emit_markdown = true;
    let controller = Controller::with_config(config).unwrap();
    let translator = MockTranslator::working();
    let summary = controller
        .run_with_translator(&input, &output, &translator)
        .unwrap();

    assert_eq!(summary.ok, 1);
    assert!(output.exists());
    assert_eq!(count_notes_in_file(&output), 3);

    let sidecar = workspace.path().join("exact").join("result.en.md");
    assert!(sidecar.exists(), "markdown sidecar must land next to the XML output");
    let markdown = fs::read_to_string(&sidecar).unwrap();
    assert!(markdown.contains("**English:** [en]"));
}

#[test]
fn test_workflow_engineFailure_shouldLeaveNoPartialOutput() {
    let workspace = create_temp_dir().unwrap();
    let input_dir = workspace.path().join("corpus");
    let output_dir = workspace.path().join("translated");
    fs::create_dir_all(&input_dir).unwrap();
    create_test_tei(&input_dir, "a.xml").unwrap();

    let controller = Controller::with_config(quiet_config()).unwrap();
    let translator = MockTranslator::failing_at(1);
    let summary = controller
        .run_with_translator(&input_dir, &output_dir, &translator)
        .unwrap();

    assert_eq!(summary.ok, 0);
    assert_eq!(summary.failed, 1);
    assert!(!output_dir.join("a.xml").exists(), "failed files must be all-or-nothing");
}

#[test]
fn test_workflow_badFileInBatch_shouldNotAbortTheRun() {
    let workspace = create_temp_dir().unwrap();
    let input_dir = workspace.path().join("corpus");
    let output_dir = workspace.path().join("translated");
    fs::create_dir_all(&input_dir).unwrap();
    create_test_file(&input_dir, "bad.xml", "<TEI><text>").unwrap();
    create_test_tei(&input_dir, "good.xml").unwrap();

    let controller = Controller::with_config(quiet_config()).unwrap();
    let translator = MockTranslator::working();
    let summary = controller
        .run_with_translator(&input_dir, &output_dir, &translator)
        .unwrap();

    assert_eq!(summary.files, 2);
    assert_eq!(summary.ok, 1);
    assert_eq!(summary.failed, 1);
    assert!(output_dir.join("good.xml").exists());
}

#[test]
fn test_workflow_outputDirInsideInputDir_shouldNotBeReconsumed() {
    let workspace = create_temp_dir().unwrap();
    let input_dir = workspace.path().join("corpus");
    let output_dir = input_dir.join("translated");
    fs::create_dir_all(&input_dir).unwrap();
    create_test_tei(&input_dir, "a.xml").unwrap();

    let controller = Controller::with_config(quiet_config()).unwrap();

    let translator = MockTranslator::working();
    let first = controller
        .run_with_translator(&input_dir, &output_dir, &translator)
        .unwrap();
    assert_eq!(first.files, 1);

    let second = controller
        .run_with_translator(&input_dir, &output_dir, &translator)
        .unwrap();
    assert_eq!(second.files, 1, "files under the output directory must not become inputs");
}
