use modal_bridge::{Error, MappingScope, Mode, ModeFrame, ModeStack, SubMode};

#[test]
fn starts_with_a_single_normal_frame() {
    let stack = ModeStack::default();
    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.mode(), Mode::Normal);
    assert_eq!(stack.sub_mode(), SubMode::None);
    assert_eq!(stack.current().scope, MappingScope::Normal);
    assert!(stack.is_base_command_mode());
}

#[test]
fn base_frame_cannot_be_popped() {
    let mut stack = ModeStack::default();
    assert!(matches!(stack.pop(), Err(Error::BaseFramePop)));
    assert_eq!(stack.depth(), 1);
}

#[test]
fn push_and_pop_follow_stack_order() {
    let mut stack = ModeStack::default();
    stack.push(ModeFrame::new(Mode::Insert, SubMode::None));
    stack.push(ModeFrame::new(Mode::Visual, SubMode::CharWise));
    assert_eq!(stack.depth(), 3);
    assert!(!stack.is_base_command_mode());
    assert_eq!(stack.current().scope, MappingScope::Visual);

    let frame = stack.pop().unwrap();
    assert_eq!(frame.mode, Mode::Visual);
    assert_eq!(stack.mode(), Mode::Insert);
    assert_eq!(stack.base().mode, Mode::Normal);
}

#[test]
fn sub_mode_changes_in_place() {
    let mut stack = ModeStack::default();
    stack.push(ModeFrame::new(Mode::Visual, SubMode::CharWise));
    stack.set_sub_mode(SubMode::BlockWise);
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.sub_mode(), SubMode::BlockWise);
}

#[test]
fn replace_uses_insert_bindings() {
    let frame = ModeFrame::new(Mode::Replace, SubMode::None);
    assert_eq!(frame.scope, MappingScope::Insert);
}

#[test]
fn insert_base_is_not_command_mode() {
    let stack = ModeStack::new(Mode::Insert);
    assert!(!stack.is_base_command_mode());
    assert_eq!(stack.base().mode, Mode::Insert);
}
