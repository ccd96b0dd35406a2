use modal_bridge::{
    Config, EditorSession, KeyCode, KeyEvent, KeyOwnershipArbiter, Mode, ModeFrame, Owner,
    Ownership, SubMode,
};

mod support;
use support::mock_host::MockHost;

fn setup() -> (KeyOwnershipArbiter, EditorSession, MockHost) {
    let config = Config::default();
    (
        KeyOwnershipArbiter::new(&config),
        EditorSession::new(&config),
        MockHost::new("hello\n"),
    )
}

fn enter(session: &mut EditorSession, mode: Mode) {
    session
        .mode_stack_mut()
        .push(ModeFrame::new(mode, SubMode::None));
}

#[test]
fn disabled_engine_leaves_everything_to_host() {
    let (mut arbiter, mut session, host) = setup();
    arbiter.set_enabled(false);
    assert_eq!(arbiter.decide(&KeyEvent::char('j'), &mut session, &host), Ownership::Host);
    assert_eq!(arbiter.decide(&KeyEvent::plain(KeyCode::Esc), &mut session, &host), Ownership::Host);
}

#[test]
fn popup_keeps_only_popup_keys() {
    let (mut arbiter, mut session, mut host) = setup();
    host.popup = true;
    assert_eq!(arbiter.decide(&KeyEvent::plain(KeyCode::Esc), &mut session, &host), Ownership::Engine);
    assert_eq!(arbiter.decide(&KeyEvent::ctrl('n'), &mut session, &host), Ownership::Engine);
    assert_eq!(arbiter.decide(&KeyEvent::char('j'), &mut session, &host), Ownership::Host);
    assert_eq!(arbiter.decide(&KeyEvent::ctrl('j'), &mut session, &host), Ownership::Host);
}

#[test]
fn configured_popup_keys_are_kept() {
    let config = Config {
        popup_keys: vec![KeyEvent::ctrl('j')],
        ..Config::default()
    };
    let mut arbiter = KeyOwnershipArbiter::new(&config);
    let mut session = EditorSession::new(&config);
    let mut host = MockHost::new("");
    host.popup = true;
    assert_eq!(arbiter.decide(&KeyEvent::ctrl('j'), &mut session, &host), Ownership::Engine);
}

#[test]
fn escape_on_secondary_surface_in_base_mode_goes_to_host() {
    let (mut arbiter, mut session, mut host) = setup();
    host.primary_surface = false;
    let esc = KeyEvent::plain(KeyCode::Esc);
    assert_eq!(arbiter.decide(&esc, &mut session, &host), Ownership::Host);
    assert_eq!(arbiter.decide(&KeyEvent::ctrl('c'), &mut session, &host), Ownership::Host);

    enter(&mut session, Mode::Insert);
    assert_eq!(arbiter.decide(&esc, &mut session, &host), Ownership::Engine);

    host.primary_surface = true;
    session.mode_stack_mut().pop_to_base();
    assert_eq!(arbiter.decide(&esc, &mut session, &host), Ownership::Engine);
}

#[test]
fn open_popup_does_not_claim_escape_on_secondary_surface() {
    let (mut arbiter, mut session, mut host) = setup();
    host.popup = true;
    host.primary_surface = false;
    let esc = KeyEvent::plain(KeyCode::Esc);
    assert_eq!(arbiter.decide(&esc, &mut session, &host), Ownership::Host);

    enter(&mut session, Mode::Insert);
    assert_eq!(arbiter.decide(&esc, &mut session, &host), Ownership::Engine);
}

#[test]
fn insert_mode_declines_tab_and_records_it() {
    let (mut arbiter, mut session, host) = setup();
    enter(&mut session, Mode::Insert);
    assert_eq!(arbiter.decide(&KeyEvent::plain(KeyCode::Tab), &mut session, &host), Ownership::Host);
    assert!(session.take_tab_requested());
    assert!(!session.take_tab_requested());

    // Tab with ctrl is a different command
    let ctrl_tab = KeyEvent::new(KeyCode::Tab, modal_bridge::Modifiers::CTRL);
    assert_eq!(arbiter.decide(&ctrl_tab, &mut session, &host), Ownership::Engine);
    assert!(!session.take_tab_requested());
}

#[test]
fn typing_in_insert_mode_goes_to_host() {
    let (mut arbiter, mut session, host) = setup();
    assert_eq!(arbiter.decide(&KeyEvent::char('a'), &mut session, &host), Ownership::Engine);
    enter(&mut session, Mode::Insert);
    assert_eq!(arbiter.decide(&KeyEvent::char('a'), &mut session, &host), Ownership::Host);
    assert_eq!(
        arbiter.decide(&KeyEvent::plain(KeyCode::Backspace), &mut session, &host),
        Ownership::Engine
    );
}

#[test]
fn replace_mode_is_treated_like_insert() {
    let (mut arbiter, mut session, host) = setup();
    enter(&mut session, Mode::Replace);
    assert_eq!(arbiter.decide(&KeyEvent::char('x'), &mut session, &host), Ownership::Host);
}

#[test]
fn arrows_in_embedded_input_go_to_host_while_inserting() {
    let (mut arbiter, mut session, mut host) = setup();
    let up = KeyEvent::plain(KeyCode::Up);
    enter(&mut session, Mode::Insert);
    assert_eq!(arbiter.decide(&up, &mut session, &host), Ownership::Engine);

    host.file_backed = false;
    assert_eq!(arbiter.decide(&up, &mut session, &host), Ownership::Host);

    session.mode_stack_mut().pop_to_base();
    assert_eq!(arbiter.decide(&up, &mut session, &host), Ownership::Engine);
}

#[test]
fn reserved_keys_win_over_host_bindings() {
    let (mut arbiter, mut session, mut host) = setup();
    host.bindings.push(KeyEvent::ctrl('w'));
    assert_eq!(arbiter.decide(&KeyEvent::ctrl('w'), &mut session, &host), Ownership::Engine);
    assert_eq!(arbiter.conflicts().get(&KeyEvent::ctrl('w')), None);
}

#[test]
fn conflicts_are_recorded_then_resolved() {
    let (mut arbiter, mut session, mut host) = setup();
    let key = KeyEvent::ctrl('d');

    assert_eq!(arbiter.decide(&key, &mut session, &host), Ownership::Engine);
    assert_eq!(arbiter.conflicts().get(&key), None);

    host.bindings.push(key);
    assert_eq!(arbiter.decide(&key, &mut session, &host), Ownership::Engine);
    assert_eq!(arbiter.conflicts().get(&key), Some(Owner::Undecided));
    assert_eq!(arbiter.conflicts().undecided().count(), 1);

    arbiter.resolve(key, Owner::Host);
    assert_eq!(arbiter.decide(&key, &mut session, &host), Ownership::Host);

    // The host no longer binds it here, so the engine keeps it
    host.bindings.clear();
    assert_eq!(arbiter.decide(&key, &mut session, &host), Ownership::Engine);

    arbiter.resolve(key, Owner::Engine);
    host.bindings.push(key);
    assert_eq!(arbiter.decide(&key, &mut session, &host), Ownership::Engine);
}

#[test]
fn learned_owners_survive_a_config_round_trip() {
    let (mut arbiter, _, _) = setup();
    arbiter.resolve(KeyEvent::ctrl('d'), Owner::Host);
    arbiter.resolve(KeyEvent::ctrl('e'), Owner::Undecided);

    let mut config = Config::default();
    arbiter.save_into(&mut config);
    let reloaded = Config::from_json(&config.to_json().unwrap()).unwrap();

    let arbiter = KeyOwnershipArbiter::new(&reloaded);
    assert_eq!(arbiter.conflicts().get(&KeyEvent::ctrl('d')), Some(Owner::Host));
    assert_eq!(arbiter.conflicts().get(&KeyEvent::ctrl('e')), Some(Owner::Undecided));
}
