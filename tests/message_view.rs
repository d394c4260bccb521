use ollama_chat::core::{Author, MessageId};
use ollama_chat::exec::ExecutionPolicy;
use ollama_chat::render::{self, AppendOutcome, MessageView, Segment, ViewState};

const REPLY: &str = "Here is a script:\n```python\nprint(1)\n```\nand to run it:\n```\npython3 demo.py\n```\nDone.";

#[test]
fn split_and_join_round_trip() {
    for text in [REPLY, "", "no fences at all", "```\nunterminated", "a ``` b ``` c"] {
        assert_eq!(render::join(&render::split(text)), text);
    }
}

#[test]
fn text_without_fences_is_one_plain_segment() {
    assert_eq!(
        render::split("just prose"),
        vec![Segment::Plain("just prose".into())]
    );
}

#[test]
fn streaming_char_by_char_matches_single_append() {
    let mut streamed = MessageView::new("", Author::Assistant, MessageId::new(1));
    for ch in REPLY.chars() {
        let outcome = streamed.append_text(&ch.to_string());
        if outcome == AppendOutcome::ScheduleCheck {
            streamed.check_reformat();
        }
    }
    streamed.finalize();

    let mut whole = MessageView::new("", Author::Assistant, MessageId::new(2));
    let _ = whole.append_text(REPLY);
    whole.finalize();

    assert_eq!(streamed.current_text(), REPLY);
    assert_eq!(whole.current_text(), REPLY);
    assert_eq!(streamed.regions(), whole.regions());
}

#[test]
fn open_fence_waits_for_closing_fence() {
    let mut view = MessageView::new("", Author::Assistant, MessageId::new(1));

    let _ = view.append_text("```python\nprint(1)\n");
    assert!(!view.check_reformat());
    assert_eq!(view.reformat_count(), 0);

    assert_eq!(view.append_text("```"), AppendOutcome::ScheduleCheck);
    assert!(view.check_reformat());
    assert_eq!(view.reformat_count(), 1);
    assert_eq!(view.state(), ViewState::Rendered);

    let languages: Vec<_> = view.code_blocks().map(|b| b.language.as_str()).collect();
    assert_eq!(languages, ["python"]);
}

#[test]
fn auto_execution_queues_each_shell_block_once() {
    let mut view = MessageView::new("", Author::Assistant, MessageId::new(1))
        .with_policy(ExecutionPolicy { auto_execute: true });

    let _ = view.append_text("```bash\necho hi\n```");
    view.check_reformat();
    let _ = view.append_text("\nagain:\n```bash\necho hi\n```");
    view.check_reformat();
    view.finalize();

    let pending = view.take_pending_executions();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].content, "echo hi");
    assert!(view.take_pending_executions().is_empty());
}

#[test]
fn execution_is_off_by_default() {
    let mut view = MessageView::new("", Author::Assistant, MessageId::new(1));
    let _ = view.append_text("```sh\nrm -rf build\n```");
    view.finalize();

    assert!(view.take_pending_executions().is_empty());
}
